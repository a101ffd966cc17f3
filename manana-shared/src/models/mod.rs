/// Database models
///
/// # Models
///
/// - `user`: user accounts with the dual-provider credential schema
/// - `task`: owner-scoped tasks
///
/// User and Task are independent aggregates; a task holds a plain foreign
/// key to its owner.

pub mod task;
pub mod user;
