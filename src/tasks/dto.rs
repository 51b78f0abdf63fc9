use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    error::ApiError,
    rpc::validate::{check_len, nullable, parse_timestamp, Validate},
    tasks::repo_types::TaskChanges,
};

const TITLE_MAX: usize = 200;

/// Request body for `createTask`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Validated `createTask` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

impl Validate for CreateTaskRequest {
    type Output = CreateTask;

    fn validate(self) -> Result<CreateTask, ApiError> {
        check_len("title", &self.title, 1, Some(TITLE_MAX))?;
        let due_date = self
            .due_date
            .as_deref()
            .map(|s| parse_timestamp("due_date", s))
            .transpose()?;
        Ok(CreateTask {
            title: self.title,
            description: self.description,
            due_date,
        })
    }
}

/// Request body for `updateTask`. Omitted fields are untouched; `null`
/// clears `description` and `due_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub completed: Option<Option<bool>>,
}

/// Validated `updateTask` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTask {
    pub id: i64,
    pub changes: TaskChanges,
}

impl Validate for UpdateTaskRequest {
    type Output = UpdateTask;

    fn validate(self) -> Result<UpdateTask, ApiError> {
        let title = match self.title {
            None => None,
            Some(None) => return Err(ApiError::validation("title", "must not be null")),
            Some(Some(t)) => {
                check_len("title", &t, 1, Some(TITLE_MAX))?;
                Some(t)
            }
        };
        let completed = match self.completed {
            None => None,
            Some(None) => return Err(ApiError::validation("completed", "must not be null")),
            Some(Some(c)) => Some(c),
        };
        let due_date = match self.due_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(s)) => Some(Some(parse_timestamp("due_date", &s)?)),
        };
        Ok(UpdateTask {
            id: self.id,
            changes: TaskChanges {
                title,
                description: self.description,
                due_date,
                completed,
            },
        })
    }
}

/// Request body for `getTask` and `deleteTask`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskIdRequest {
    pub id: i64,
}

impl Validate for TaskIdRequest {
    type Output = i64;

    fn validate(self) -> Result<i64, ApiError> {
        Ok(self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub success: bool,
}
