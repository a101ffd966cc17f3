/// Authentication context for request handling
///
/// After the API's JWT middleware validates a bearer token, it inserts an
/// `AuthContext` into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor and treat `user_id` as the authenticated
/// subject; there is no re-verification against the user store.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use manana_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::AuthProvider;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID (the verified token subject)
    pub user_id: Uuid,

    /// Provider the session was established with
    pub provider: AuthProvider,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            provider: claims.provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, AuthProvider::External, TokenType::Access);

        let ctx = AuthContext::from_claims(&claims);
        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.provider, AuthProvider::External);
    }
}
