/// Database layer for Taskboard
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded schema migrations
///
/// Models are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
