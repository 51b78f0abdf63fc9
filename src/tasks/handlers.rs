use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    rpc::extract::ValidJson,
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, DeleteTaskResponse, TaskIdRequest, UpdateTaskRequest},
        repo_types::Task,
    },
};

// AuthUser runs before the body extractor, so a bad token wins over a bad payload.

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/getTasks", get(get_tasks).post(get_tasks))
        .route("/getTask", post(get_task))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/createTask", post(create_task))
        .route("/updateTask", post(update_task))
        .route("/deleteTask", post(delete_task))
}

#[instrument(skip(state, identity, input), fields(user_id = identity.user_id))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidJson(input): ValidJson<CreateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.tasks.create(identity.user_id, input).await?))
}

#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn get_tasks(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks.list(identity.user_id).await?))
}

#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidJson(id): ValidJson<TaskIdRequest>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.tasks.get(identity.user_id, id).await?))
}

#[instrument(skip(state, identity, input), fields(user_id = identity.user_id))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidJson(input): ValidJson<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.tasks.update(identity.user_id, input).await?))
}

#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidJson(id): ValidJson<TaskIdRequest>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
    let success = state.tasks.delete(identity.user_id, id).await?;
    Ok(Json(DeleteTaskResponse { success }))
}
