use std::sync::Arc;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepo, UserRepo},
        services::AuthService,
    },
    config::{AppConfig, StoreBackend},
    db,
    memory::MemoryStore,
    tasks::{
        repo::{PgTaskRepo, TaskRepo},
        services::TaskService,
    },
};

/// Everything a request handler needs; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtKeys,
    pub auth: AuthService,
    pub tasks: TaskService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        match config.store {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await?;
                let users = Arc::new(PgUserRepo::new(pool.clone()));
                let tasks = Arc::new(PgTaskRepo::new(pool));
                Ok(Self::from_parts(&config, users, tasks))
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn from_parts(
        config: &AppConfig,
        users: Arc<dyn UserRepo>,
        tasks: Arc<dyn TaskRepo>,
    ) -> Self {
        let jwt = JwtKeys::new(&config.jwt);
        Self {
            auth: AuthService::new(users, jwt.clone()),
            tasks: TaskService::new(tasks),
            jwt,
        }
    }

    /// Fresh state backed by its own in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::default());
        Self::from_parts(&config, store.clone(), store)
    }

    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_tests())
    }
}
