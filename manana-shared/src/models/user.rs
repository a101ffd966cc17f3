/// User model and database operations
///
/// A user record is created on first successful local signup or first
/// successful external sign-in, and carries exactly one provider tag at a
/// time. Email is globally unique regardless of provider.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE auth_provider AS ENUM ('local', 'external');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255),
///     provider auth_provider NOT NULL DEFAULT 'local',
///     external_subject VARCHAR(255),
///     email_verified_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// `password_hash` is present only for local-credential users and
/// `external_subject` only for external ones; the provider tag says which.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Authentication provider tag
///
/// Discriminator marking whether a user's credential originates from a
/// local password or an external identity assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Password-based credential held by Manana
    Local,

    /// Identity asserted by an external provider (e.g. Google)
    External,
}

impl AuthProvider {
    /// Converts provider to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::External => "external",
        }
    }
}

/// User account record
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the
/// hash is never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Normalized email address (trimmed, lowercase; unique)
    pub email: String,

    /// Argon2id password hash (local users only)
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Which kind of credential this account is bound to
    pub provider: AuthProvider,

    /// Stable subject id at the external provider (external users only)
    pub external_subject: Option<String>,

    /// When the email was verified (set at creation for external users)
    pub email_verified_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last signed in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a local-credential user
///
/// The email must already be normalized and the password already hashed;
/// `auth::credentials::create_local_user` is the operation that does both.
#[derive(Debug, Clone)]
pub struct CreateLocalUser {
    /// Display name
    pub name: String,

    /// Normalized email
    pub email: String,

    /// Argon2id password hash (NOT a raw password)
    pub password_hash: String,
}

/// Input for creating an external-identity user
#[derive(Debug, Clone)]
pub struct CreateExternalUser {
    /// Display name from the external profile
    pub name: String,

    /// Normalized email
    pub email: String,

    /// Subject id at the external provider
    pub external_subject: String,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, provider, external_subject, \
                            email_verified_at, created_at, updated_at, last_login_at";

impl User {
    /// Creates a local-credential user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database operation fails.
    pub async fn create_local(pool: &PgPool, data: CreateLocalUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, provider)
            VALUES ($1, $2, $3, 'local')
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Creates an external-identity user
    ///
    /// The email is marked verified at creation time; the external provider
    /// already verified it.
    pub async fn create_external(
        pool: &PgPool,
        data: CreateExternalUser,
    ) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, provider, external_subject, email_verified_at)
            VALUES ($1, $2, 'external', $3, NOW())
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.external_subject)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by normalized email
    ///
    /// Lookup is case-insensitive via the CITEXT column; callers should
    /// still pass a normalized email so stored and queried forms agree.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#,
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash
    ///
    /// This is the only write path for the hash column. Callers go through
    /// `auth::credentials::set_password`, which rehashes the raw password
    /// every time; a hash is never copied between accounts or reused.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND provider = 'local'
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps the last-login timestamp
    ///
    /// Called after every successful sign-in, local or external.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_as_str() {
        assert_eq!(AuthProvider::Local.as_str(), "local");
        assert_eq!(AuthProvider::External.as_str(), "external");
    }

    #[test]
    fn test_provider_serde_roundtrip() {
        let json = serde_json::to_string(&AuthProvider::External).unwrap();
        assert_eq!(json, "\"external\"");

        let back: AuthProvider = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AuthProvider::External);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@gmail.com".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            provider: AuthProvider::Local,
            external_subject: None,
            email_verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("test@gmail.com"));
    }

    // Integration tests for database operations require a live database
    // and are intentionally not part of the unit suite.
}
