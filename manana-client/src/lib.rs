//! # Manana Client
//!
//! The dashboard's sync layer: an in-memory mirror of the signed-in
//! user's task list, kept current against the Manana API.
//!
//! Status changes and deletes apply optimistically with snapshot rollback
//! on failure; create and edit wait for the server's canonical record.
//! Filtering and sorting are pure views recomputed from the mirror.
//!
//! ## Modules
//!
//! - `api`: the `TaskApi` trait and its reqwest implementation
//! - `sync`: the `TaskMirror` and its update protocol
//! - `view`: pure filter/sort/summary functions

pub mod api;
pub mod sync;
pub mod view;

pub use api::{ClientError, HttpTaskApi, TaskApi};
pub use sync::TaskMirror;
pub use view::{summarize, visible_tasks, StatusSummary, TaskFilter};
