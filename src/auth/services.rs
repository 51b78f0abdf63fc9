use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, SignInRequest, SignUpRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_dummy, verify_password},
        repo::{CreateUserError, UserRepo},
        repo_types::NewUser,
    },
    error::{ApiError, INVALID_CREDENTIALS},
};

/// Sign-up and sign-in over an injected user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    /// Username conflicts are reported before email conflicts.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<AuthResponse, ApiError> {
        if self.users.find_by_username(&req.username).await?.is_some() {
            warn!("username already registered");
            return Err(ApiError::Conflict { field: "username" });
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "email already registered");
            return Err(ApiError::Conflict { field: "email" });
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .users
            .create(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                CreateUserError::UsernameTaken => ApiError::Conflict { field: "username" },
                CreateUserError::EmailTaken => ApiError::Conflict { field: "email" },
                CreateUserError::Other(e) => ApiError::Internal(e),
            })?;

        let token = self.keys.issue(user.id, &user.email)?;
        info!(user_id = user.id, "user registered");
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn sign_in(&self, req: SignInRequest) -> Result<AuthResponse, ApiError> {
        let Some(user) = self.users.find_by_email(&req.email).await? else {
            verify_dummy(&req.password);
            warn!("sign-in unknown email");
            return Err(ApiError::Authentication(INVALID_CREDENTIALS));
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = user.id, "sign-in wrong password");
            return Err(ApiError::Authentication(INVALID_CREDENTIALS));
        }

        let token = self.keys.issue(user.id, &user.email)?;
        info!(user_id = user.id, "user signed in");
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }
}
