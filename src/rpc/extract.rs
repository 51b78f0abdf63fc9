use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::validate::Validate;
use crate::error::ApiError;

/// JSON body that has been deserialized and validated. Holds the validated output.
pub struct ValidJson<T: Validate>(pub T::Output);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation("body", e.body_text()))?;
        let input = parse_json::<T>(&bytes)?;
        Ok(ValidJson(input.validate()?))
    }
}

/// Deserializes `bytes` and reports the offending field on failure.
/// An empty body is read as `{}`.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        bytes
    };
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        debug!(%path, error = %inner, "rejected rpc payload");
        let field = if path == "." {
            missing_field(&inner.to_string()).unwrap_or_else(|| "body".into())
        } else {
            path
        };
        ApiError::validation(field, strip_position(&inner.to_string()))
    })
}

fn missing_field(msg: &str) -> Option<String> {
    lazy_static! {
        static ref MISSING_RE: Regex = Regex::new(r"missing field `([^`]+)`").unwrap();
    }
    MISSING_RE.captures(msg).map(|c| c[1].to_string())
}

fn strip_position(msg: &str) -> String {
    match msg.find(" at line ") {
        Some(i) => msg[..i].to_string(),
        None => msg.to_string(),
    }
}
