//! Persistence layer for skyplan: configuration, connection pool, embedded
//! migrations, row models and query functions.

pub mod catalog;
pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
