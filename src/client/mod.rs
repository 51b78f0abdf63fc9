//! Typed client for the `/rpc` procedures.

pub mod filter;
pub mod session;

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    auth::dto::{AuthResponse, SignInRequest, SignUpRequest},
    rpc::Health,
    tasks::{
        dto::{CreateTaskRequest, DeleteTaskResponse, TaskIdRequest, UpdateTaskRequest},
        repo_types::Task,
    },
};
use session::{Session, SessionStore};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{code} ({status}): {message}")]
    Rpc {
        status: StatusCode,
        code: String,
        message: String,
        field: Option<String>,
    },
    #[error("not signed in")]
    NotSignedIn,
    #[error("session store: {0:#}")]
    Session(anyhow::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
    field: Option<String>,
}

pub struct TaskClient<S: SessionStore> {
    http: Client,
    base_url: String,
    session: S,
}

impl<S: SessionStore> TaskClient<S> {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>, session: S) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Previously saved session, if readable. An unreadable one is discarded.
    pub fn restore(&self) -> Option<Session> {
        match self.session.load() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "discarding unreadable session");
                if let Err(e) = self.session.clear() {
                    warn!(error = %e, "failed to clear session");
                }
                None
            }
        }
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear().map_err(ClientError::Session)
    }

    pub async fn healthcheck(&self) -> Result<Health, ClientError> {
        self.call::<(), _>(Method::GET, "healthcheck", None, None).await
    }

    pub async fn sign_up(&self, req: &SignUpRequest) -> Result<AuthResponse, ClientError> {
        let res: AuthResponse = self.call(Method::POST, "signUp", Some(req), None).await?;
        self.remember(&res)?;
        Ok(res)
    }

    pub async fn sign_in(&self, req: &SignInRequest) -> Result<AuthResponse, ClientError> {
        let res: AuthResponse = self.call(Method::POST, "signIn", Some(req), None).await?;
        self.remember(&res)?;
        Ok(res)
    }

    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<Task, ClientError> {
        let token = self.token()?;
        self.call(Method::POST, "createTask", Some(req), Some(&token)).await
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let token = self.token()?;
        self.call::<(), _>(Method::GET, "getTasks", None, Some(&token)).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let token = self.token()?;
        self.call(Method::POST, "getTask", Some(&TaskIdRequest { id }), Some(&token))
            .await
    }

    pub async fn update_task(&self, req: &UpdateTaskRequest) -> Result<Task, ClientError> {
        let token = self.token()?;
        self.call(Method::POST, "updateTask", Some(req), Some(&token)).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool, ClientError> {
        let token = self.token()?;
        let res: DeleteTaskResponse = self
            .call(Method::POST, "deleteTask", Some(&TaskIdRequest { id }), Some(&token))
            .await?;
        Ok(res.success)
    }

    fn remember(&self, res: &AuthResponse) -> Result<(), ClientError> {
        self.session
            .save(&Session {
                token: res.token.clone(),
                user: res.user.clone(),
            })
            .map_err(ClientError::Session)
    }

    fn token(&self) -> Result<String, ClientError> {
        self.restore()
            .map(|s| s.token)
            .ok_or(ClientError::NotSignedIn)
    }

    async fn call<I, O>(
        &self,
        method: Method,
        procedure: &str,
        input: Option<&I>,
        token: Option<&str>,
    ) -> Result<O, ClientError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let url = format!("{}/rpc/{}", self.base_url, procedure);
        let mut req = self.http.request(method, &url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(input) = input {
            req = req.json(input);
        }

        let resp = req.send().await?;
        let status = resp.status();
        debug!(procedure, %status, "rpc call");
        if status.is_success() {
            return Ok(resp.json::<O>().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::Rpc {
                status,
                code: body.error.code,
                message: body.error.message,
                field: body.error.field,
            },
            Err(_) => ClientError::Rpc {
                status,
                code: "UNKNOWN".into(),
                message: text,
                field: None,
            },
        })
    }
}
