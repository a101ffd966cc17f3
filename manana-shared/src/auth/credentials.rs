/// Credential store: local account creation and verification
///
/// Owns the password lifecycle for local-credential users. Raw passwords
/// exist only transiently inside these functions; everything persisted is
/// an Argon2id hash, and setting a password always rehashes.
///
/// The email domain allowlist is a business rule (the product is scoped to
/// a few consumer mail providers), not a security control.

use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{
    hash_password, validate_password_policy, verify_password, PasswordError,
};
use crate::models::user::{AuthProvider, CreateLocalUser, User};

/// Email domains accepted at signup
pub const ALLOWED_EMAIL_DOMAINS: [&str; 3] = ["gmail.com", "outlook.com", "yahoo.com"];

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Email domain is not in the allowlist
    #[error("Invalid email domain")]
    DomainNotAllowed,

    /// Password fails the signup policy
    #[error("Password must be at least 8 characters with one uppercase letter")]
    WeakPassword,

    /// Email already has an account
    #[error("Email already exists")]
    EmailTaken,

    /// No account for this email
    #[error("User not found")]
    UserNotFound,

    /// Account exists but is bound to the other provider
    #[error("Email already registered with a different method")]
    ProviderMismatch,

    /// Password did not match
    #[error("Invalid email or password")]
    BadCredential,

    /// Hashing/verification machinery failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Normalizes a raw email: trim then lowercase
///
/// All lookups and inserts go through this so stored and queried forms
/// agree.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks the email's domain against the allowlist
pub fn is_allowed_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, domain)) => ALLOWED_EMAIL_DOMAINS.contains(&domain),
        None => false,
    }
}

/// Creates a local-credential user
///
/// Normalizes the email, enforces the domain allowlist and password
/// policy, rejects duplicate emails, hashes the password, and persists the
/// record with `provider = local`.
///
/// # Errors
///
/// - `DomainNotAllowed` / `WeakPassword` for policy violations
/// - `EmailTaken` when the normalized email already has an account
///   (whichever provider it is bound to)
/// - `Password` / `Database` for infrastructure failures
pub async fn create_local_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    raw_password: &str,
) -> Result<User, CredentialError> {
    let email = normalize_email(email);

    if !is_allowed_domain(&email) {
        return Err(CredentialError::DomainNotAllowed);
    }

    if User::find_by_email(pool, &email).await?.is_some() {
        return Err(CredentialError::EmailTaken);
    }

    if validate_password_policy(raw_password).is_err() {
        return Err(CredentialError::WeakPassword);
    }

    let password_hash = hash_password(raw_password)?;

    let user = User::create_local(
        pool,
        CreateLocalUser {
            name: name.trim().to_string(),
            email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, "Created local user");

    Ok(user)
}

/// Verifies a local credential and returns the user
///
/// # Errors
///
/// - `UserNotFound` when no account exists for the normalized email
/// - `ProviderMismatch` when the account is external (the caller should
///   use external sign-in instead)
/// - `BadCredential` when the password does not match
pub async fn verify_local_credential(
    pool: &PgPool,
    email: &str,
    raw_password: &str,
) -> Result<User, CredentialError> {
    let email = normalize_email(email);

    let user = User::find_by_email(pool, &email)
        .await?
        .ok_or(CredentialError::UserNotFound)?;

    if user.provider != AuthProvider::Local {
        return Err(CredentialError::ProviderMismatch);
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(CredentialError::BadCredential)?;

    if !verify_password(raw_password, hash)? {
        return Err(CredentialError::BadCredential);
    }

    Ok(user)
}

/// Sets a new password for a local user
///
/// The raw password is rehashed unconditionally; hashes are never reused
/// or compared against the old one.
pub async fn set_password(
    pool: &PgPool,
    user_id: uuid::Uuid,
    raw_password: &str,
) -> Result<(), CredentialError> {
    if validate_password_policy(raw_password).is_err() {
        return Err(CredentialError::WeakPassword);
    }

    let password_hash = hash_password(raw_password)?;

    if !User::set_password_hash(pool, user_id, &password_hash).await? {
        return Err(CredentialError::UserNotFound);
    }

    info!(user_id = %user_id, "Password updated");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Gmail.COM "), "user@gmail.com");
        assert_eq!(normalize_email("plain@yahoo.com"), "plain@yahoo.com");
    }

    #[test]
    fn test_allowed_domains() {
        assert!(is_allowed_domain("a@gmail.com"));
        assert!(is_allowed_domain("b@outlook.com"));
        assert!(is_allowed_domain("c@yahoo.com"));

        assert!(!is_allowed_domain("d@example.com"));
        assert!(!is_allowed_domain("e@gmail.com.evil.com"));
        assert!(!is_allowed_domain("no-at-sign"));
    }

    #[test]
    fn test_domain_check_uses_last_at() {
        // rsplit_once: the domain is whatever follows the final @
        assert!(is_allowed_domain("weird@name@gmail.com"));
    }
}
