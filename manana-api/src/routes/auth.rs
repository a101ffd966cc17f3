/// Identity endpoints
///
/// # Endpoints
///
/// - `POST /signup` - create a local-credential account (201)
/// - `POST /login` - local sign-in, returns tokens
/// - `POST /auth/google` - external sign-in from a verified profile
/// - `POST /auth/refresh` - exchange a refresh token for a new access token
///
/// The external endpoint receives the profile the session library already
/// verified (email, display name, subject id); assertion verification is
/// not done here.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::first_validation_message,
};
use axum::{extract::State, http::StatusCode, Json};
use manana_shared::auth::{credentials, identity, jwt};
use manana_shared::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address (domain allowlist enforced by the credential store)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Raw password (policy enforced by the credential store)
    pub password: String,
}

/// Public view of a user, as returned by signup
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Normalized email
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Sign-in response (local and external flows)
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    /// User ID
    pub user_id: Uuid,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<SignInResponse> {
    let access_claims = jwt::Claims::new(user.id, user.provider, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.provider, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(SignInResponse {
        user_id: user.id,
        access_token,
        refresh_token,
    })
}

/// Create a local account
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// { "name": "Ada", "email": "ada@gmail.com", "password": "Lovelace1" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failure or duplicate email
/// - `500 Internal Server Error`: server error
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(first_validation_message(&e)))?;

    let user =
        credentials::create_local_user(&state.db, &req.name, &req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Local sign-in
///
/// # Errors
///
/// - `400 Bad Request`: validation failure
/// - `401 Unauthorized`: wrong password or external-only account
/// - `404 Not Found`: no account for this email
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SignInResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(first_validation_message(&e)))?;

    let user = identity::authenticate_local(&state.db, &req.email, &req.password).await?;

    Ok(Json(issue_tokens(&state, &user)?))
}

/// External sign-in
///
/// Accepts the verified external profile and resolves it to a user:
/// first sign-in creates the account, a returning external user is
/// authenticated, and an email already bound to a local account is
/// rejected with 401 rather than silently merged.
pub async fn google_sign_in(
    State(state): State<AppState>,
    Json(profile): Json<identity::ExternalProfile>,
) -> ApiResult<Json<SignInResponse>> {
    let user = identity::reconcile_external(&state.db, &profile).await?;

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Access-token refresh
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let req = SignupRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "Lovelace1".to_string(),
        };
        assert!(req.validate().is_err());

        let req = SignupRequest {
            name: "Ada".to_string(),
            email: "ada@gmail.com".to_string(),
            password: "Lovelace1".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_user_response_from_user() {
        use chrono::Utc;
        use manana_shared::models::user::AuthProvider;

        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@gmail.com".to_string(),
            password_hash: Some("$argon2id$x".to_string()),
            provider: AuthProvider::Local,
            external_subject: None,
            email_verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let resp = UserResponse::from(user.clone());
        assert_eq!(resp.id, user.id);
        assert_eq!(resp.email, "ada@gmail.com");

        // The response type has no hash field at all
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
