/// Error handling for the API server
///
/// A single error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>` and conversions from the shared library's error
/// enums decide the status code. Error bodies are always
/// `{ "error": <message> }`.
///
/// Internal errors are logged server-side and replaced with a generic
/// message before reaching the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use manana_shared::auth::{
    credentials::CredentialError, identity::IdentityError, jwt::JwtError, password::PasswordError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
///
/// `Conflict` maps to 400 rather than 409: a duplicate email is reported
/// the same way as any other bad signup input.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing required input (400)
    Validation(String),

    /// Duplicate unique field (400)
    Conflict(String),

    /// Missing or foreign-owned entity (404)
    NotFound(String),

    /// Missing/invalid session or provider mismatch (401)
    Auth(String),

    /// Store or connectivity failure (500); detail stays server-side
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Auth(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Auth(msg) => msg,
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint on users.email surfaces as a conflict
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert credential store errors to API errors
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DomainNotAllowed | CredentialError::WeakPassword => {
                ApiError::Validation(err.to_string())
            }
            CredentialError::EmailTaken => ApiError::Conflict(err.to_string()),
            CredentialError::UserNotFound => ApiError::NotFound(err.to_string()),
            CredentialError::ProviderMismatch | CredentialError::BadCredential => {
                ApiError::Auth(err.to_string())
            }
            CredentialError::Password(e) => {
                ApiError::Internal(format!("Password operation failed: {}", e))
            }
            CredentialError::Database(e) => e.into(),
        }
    }
}

/// Convert identity reconciliation errors to API errors
impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MethodConflict => ApiError::Auth(err.to_string()),
            IdentityError::DomainNotAllowed => ApiError::Validation(err.to_string()),
            IdentityError::Credential(e) => e.into(),
            IdentityError::Database(e) => e.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Auth("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => ApiError::Auth("Invalid token issuer".to_string()),
            _ => ApiError::Auth(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Auth("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_credential_error_mapping() {
        let err: ApiError = CredentialError::EmailTaken.into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = CredentialError::ProviderMismatch.into();
        assert!(matches!(err, ApiError::Auth(_)));

        let err: ApiError = CredentialError::UserNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = CredentialError::WeakPassword.into();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_identity_error_mapping() {
        let err: ApiError = IdentityError::MethodConflict.into();
        match err {
            ApiError::Auth(msg) => {
                assert_eq!(msg, "Email already registered with a different method")
            }
            other => panic!("Expected Auth, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::Internal("connection refused on 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.error, "Internal server error");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::Validation("Title is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, serde_json::json!({ "error": "Title is required" }));
    }
}
