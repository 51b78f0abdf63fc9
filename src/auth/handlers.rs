use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::dto::{AuthResponse, SignInRequest, SignUpRequest},
    error::ApiError,
    rpc::extract::ValidJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signUp", post(sign_up))
        .route("/signIn", post(sign_in))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignUpRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.auth.sign_up(payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignInRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.auth.sign_in(payload).await?))
}
