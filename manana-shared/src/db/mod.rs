/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks and
///   a fixed per-statement timeout
///
/// Models live in the `models` module at crate root level.

pub mod pool;
