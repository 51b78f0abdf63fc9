use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use crate::{
    error::{ApiError, TASK_NOT_FOUND},
    tasks::{
        dto::{CreateTask, UpdateTask},
        repo::TaskRepo,
        repo_types::{NewTask, Task},
    },
};

/// Ownership-scoped task operations over an injected task store.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepo>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepo>) -> Self {
        Self { tasks }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, user_id: i64, input: CreateTask) -> Result<Task, ApiError> {
        let task = self
            .tasks
            .insert(NewTask {
                user_id,
                title: input.title,
                description: input.description,
                due_date: input.due_date,
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;
        info!(task_id = task.id, "task created");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i64) -> Result<Vec<Task>, ApiError> {
        let tasks = self.tasks.list_by_user(user_id).await?;
        debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: i64, task_id: i64) -> Result<Task, ApiError> {
        self.load_owned(user_id, task_id).await
    }

    #[instrument(skip(self, input), fields(task_id = input.id))]
    pub async fn update(&self, user_id: i64, input: UpdateTask) -> Result<Task, ApiError> {
        self.load_owned(user_id, input.id).await?;
        let task = self
            .tasks
            .update_owned(user_id, input.id, &input.changes, OffsetDateTime::now_utc())
            .await?
            // deleted between the load and the update
            .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;
        info!("task updated");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, task_id: i64) -> Result<bool, ApiError> {
        let removed = self.tasks.delete_owned(user_id, task_id).await?;
        info!(removed, "task delete");
        Ok(removed)
    }

    /// Absent and foreign-owned tasks produce the same error.
    async fn load_owned(&self, user_id: i64, task_id: i64) -> Result<Task, ApiError> {
        self.tasks
            .find_owned(user_id, task_id)
            .await?
            .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
    }
}
