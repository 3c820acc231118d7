//! Query functions, one module per table.
//!
//! Every function is generic over [`sqlx::PgExecutor`] so it can run against
//! the pool directly or inside a caller's transaction (`&mut *tx`).

pub mod plans;
pub mod programs;
pub mod star_systems;
pub mod validation_results;
