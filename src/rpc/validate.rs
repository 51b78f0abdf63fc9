use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    UtcOffset,
};

use crate::error::ApiError;

/// Input payload that must be checked (and possibly converted) before dispatch.
pub trait Validate: Sized {
    type Output;

    fn validate(self) -> Result<Self::Output, ApiError>;
}

pub fn check_len(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min {
        return Err(ApiError::validation(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if let Some(max) = max {
        if len > max {
            return Err(ApiError::validation(
                field,
                format!("must be at most {max} characters"),
            ));
        }
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn check_email(field: &str, value: &str) -> Result<(), ApiError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(ApiError::validation(field, "invalid email"))
    }
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
/// The result is always in UTC, matching what a `TIMESTAMPTZ` column returns.
pub fn parse_timestamp(field: &str, value: &str) -> Result<OffsetDateTime, ApiError> {
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| ApiError::validation(field, "expected an RFC 3339 timestamp or YYYY-MM-DD date"))
}

/// Distinguishes an omitted field (`None`) from an explicit `null` (`Some(None)`).
/// Pair with `#[serde(default)]`.
pub fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
