use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::tasks::repo_types::{NewTask, Task, TaskChanges};

/// Persistence for tasks. Every read and write past `insert` is scoped by owner.
#[async_trait]
pub trait TaskRepo: Send + Sync {
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task>;
    /// Newest first; ties broken by id, newest first.
    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Task>>;
    async fn find_owned(&self, user_id: i64, task_id: i64) -> anyhow::Result<Option<Task>>;
    async fn update_owned(
        &self,
        user_id: i64,
        task_id: i64,
        changes: &TaskChanges,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Task>>;
    /// `true` only when a row owned by `user_id` was removed.
    async fn delete_owned(&self, user_id: i64, task_id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTaskRepo {
    db: PgPool,
}

impl PgTaskRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepo for PgTaskRepo {
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, false, $5, $5)
            RETURNING id, user_id, title, description, due_date, completed, created_at, updated_at
            "#,
        )
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.created_at)
        .fetch_one(&self.db)
        .await
        .context("insert task")?;
        Ok(row)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, due_date, completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list tasks by user")?;
        Ok(rows)
    }

    async fn find_owned(&self, user_id: i64, task_id: i64) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, due_date, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find owned task")?;
        Ok(row)
    }

    async fn update_owned(
        &self,
        user_id: i64,
        task_id: i64,
        changes: &TaskChanges,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
               SET title       = COALESCE($3, title),
                   description = CASE WHEN $4 THEN $5 ELSE description END,
                   due_date    = CASE WHEN $6 THEN $7 ELSE due_date END,
                   completed   = COALESCE($8, completed),
                   updated_at  = $9
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, due_date, completed, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(changes.due_date.is_some())
        .bind(changes.due_date.flatten())
        .bind(changes.completed)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("update owned task")?;
        Ok(row)
    }

    async fn delete_owned(&self, user_id: i64, task_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete owned task")?;
        Ok(res.rows_affected() > 0)
    }
}
