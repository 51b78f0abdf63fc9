pub mod extract;
pub mod validate;

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{auth, state::AppState, tasks};

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

pub async fn healthcheck() -> Json<Health> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(Health {
        status: "ok".into(),
        timestamp,
    })
}

/// Public and protected procedures, mounted under `/rpc`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .merge(auth::router())
        .merge(tasks::router())
}

#[cfg(test)]
mod tests;
