use serde::{Deserialize, Serialize};

use crate::{
    auth::repo_types::PublicUser,
    error::ApiError,
    rpc::validate::{check_email, check_len, Validate},
};

/// Request body for `signUp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `signIn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after sign-up or sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Validate for SignUpRequest {
    type Output = Self;

    fn validate(mut self) -> Result<Self, ApiError> {
        self.username = self.username.trim().to_string();
        self.email = normalize_email(&self.email);
        check_len("username", &self.username, 3, Some(50))?;
        check_email("email", &self.email)?;
        check_len("password", &self.password, 6, None)?;
        Ok(self)
    }
}

impl Validate for SignInRequest {
    type Output = Self;

    fn validate(mut self) -> Result<Self, ApiError> {
        self.email = normalize_email(&self.email);
        check_email("email", &self.email)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(username: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn rejected_field(res: Result<SignUpRequest, ApiError>) -> String {
        match res {
            Err(ApiError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn sign_up_normalizes_email_and_username() {
        let req = sign_up("  alice ", " Alice@Example.COM ", "secret1").validate().unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.email, "alice@example.com");
    }

    #[test]
    fn sign_up_bounds() {
        assert_eq!(rejected_field(sign_up("ab", "a@b.co", "secret1").validate()), "username");
        assert_eq!(rejected_field(sign_up(&"x".repeat(51), "a@b.co", "secret1").validate()), "username");
        assert_eq!(rejected_field(sign_up("alice", "not-an-email", "secret1").validate()), "email");
        assert_eq!(rejected_field(sign_up("alice", "a@b.co", "12345").validate()), "password");
    }

    #[test]
    fn sign_in_accepts_any_password_length() {
        let req = SignInRequest {
            email: "a@b.co".into(),
            password: "x".into(),
        };
        assert!(req.validate().is_ok());
    }
}
