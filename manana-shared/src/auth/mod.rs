/// Authentication and identity
///
/// - `password`: Argon2id hashing and the signup password policy
/// - `credentials`: local account creation/verification (the credential store)
/// - `identity`: reconciliation of local and external sign-ins to a user id
/// - `jwt`: HS256 session tokens (access + refresh)
/// - `middleware`: the `AuthContext` carried through request extensions

pub mod credentials;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
