use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    auth::{
        repo::{CreateUserError, UserRepo},
        repo_types::{NewUser, User},
    },
    tasks::{
        repo::TaskRepo,
        repo_types::{NewTask, Task, TaskChanges},
    },
};

/// In-process credential store with the same uniqueness and ownership rules
/// as the Postgres schema. Task owners are not checked against `users`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.inner.lock().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.inner.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, CreateUserError> {
        let mut t = self.inner.lock().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(CreateUserError::UsernameTaken);
        }
        if t.users.values().any(|u| u.email == user.email) {
            return Err(CreateUserError::EmailTaken);
        }
        t.next_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: t.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl TaskRepo for MemoryStore {
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task> {
        let mut t = self.inner.lock().await;
        t.next_task_id += 1;
        let row = Task {
            id: t.next_task_id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            completed: false,
            created_at: task.created_at,
            updated_at: task.created_at,
        };
        t.tasks.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Task>> {
        let t = self.inner.lock().await;
        let mut rows: Vec<Task> = t
            .tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_owned(&self, user_id: i64, task_id: i64) -> anyhow::Result<Option<Task>> {
        let t = self.inner.lock().await;
        Ok(t.tasks
            .get(&task_id)
            .filter(|task| task.user_id == user_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        user_id: i64,
        task_id: i64,
        changes: &TaskChanges,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Task>> {
        let mut t = self.inner.lock().await;
        match t.tasks.get_mut(&task_id) {
            Some(task) if task.user_id == user_id => {
                changes.apply(task, now);
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_owned(&self, user_id: i64, task_id: i64) -> anyhow::Result<bool> {
        let mut t = self.inner.lock().await;
        let owned = t
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.user_id == user_id);
        if owned {
            t.tasks.remove(&task_id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "hashed_password".into(),
        }
    }

    #[tokio::test]
    async fn ids_are_generated_sequentially() {
        let store = MemoryStore::default();
        let a = store.create(new_user("a", "a@example.com")).await.unwrap();
        let b = store.create(new_user("b", "b@example.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn uniqueness_is_enforced_on_insert() {
        let store = MemoryStore::default();
        store.create(new_user("a", "a@example.com")).await.unwrap();
        assert!(matches!(
            store.create(new_user("a", "x@example.com")).await,
            Err(CreateUserError::UsernameTaken)
        ));
        assert!(matches!(
            store.create(new_user("x", "a@example.com")).await,
            Err(CreateUserError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn update_of_foreign_task_is_a_no_op() {
        let store = MemoryStore::default();
        let now = OffsetDateTime::now_utc();
        let task = store
            .insert(NewTask {
                user_id: 1,
                title: "mine".into(),
                description: None,
                due_date: None,
                created_at: now,
            })
            .await
            .unwrap();
        let changes = TaskChanges {
            completed: Some(true),
            ..Default::default()
        };
        assert!(store.update_owned(2, task.id, &changes, now).await.unwrap().is_none());
        assert!(!store.find_owned(1, task.id).await.unwrap().unwrap().completed);
    }
}
