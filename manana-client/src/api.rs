/// Task API client
///
/// The sync layer talks to the server through the `TaskApi` trait so tests
/// can substitute an in-memory implementation. `HttpTaskApi` is the real
/// one: a thin reqwest wrapper that sends the bearer token and translates
/// the server's `{ "error": <message> }` bodies into typed errors.

use async_trait::async_trait;
use manana_shared::models::task::{NewTask, Task, TaskPatch};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server rejected the request; carries the server's message
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the error body
        message: String,
    },

    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// Task is not present in the local mirror
    #[error("Task not found")]
    NotInMirror,

    /// Transport-level failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Server error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Operations the sync layer needs from the server
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetches the full task list, newest first
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ClientError>;

    /// Creates a task; returns the canonical record with server-assigned
    /// id and timestamps
    async fn create_task(&self, draft: &NewTask) -> Result<Task, ClientError>;

    /// Applies a partial update; returns the canonical updated record
    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, ClientError>;

    /// Deletes a task; returns the deleted record
    async fn delete_task(&self, id: Uuid) -> Result<Task, ClientError>;
}

/// HTTP implementation of `TaskApi`
pub struct HttpTaskApi {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HttpTaskApi {
    /// Creates a client for the given server and session token
    ///
    /// `base_url` should not have a trailing slash, e.g.
    /// `https://manana.example.com`.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Parses a response: success bodies deserialize to `T`, error bodies
    /// become `ClientError::Api` with the server's message
    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self
            .http
            .get(self.url("/tasks"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn create_task(&self, draft: &NewTask) -> Result<Task, ClientError> {
        let response = self
            .http
            .post(self.url("/tasks"))
            .bearer_auth(&self.access_token)
            .json(draft)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, ClientError> {
        let response = self
            .http
            .patch(self.url(&format!("/tasks/{}", id)))
            .bearer_auth(&self.access_token)
            .json(patch)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<Task, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/tasks/{}", id)))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_path() {
        let api = HttpTaskApi::new("http://localhost:8080", "token");
        assert_eq!(api.url("/tasks"), "http://localhost:8080/tasks");
    }

    #[test]
    fn test_client_error_display_uses_server_message() {
        let err = ClientError::Api {
            status: 404,
            message: "Task not found".to_string(),
        };
        assert_eq!(err.to_string(), "Task not found");
    }
}
