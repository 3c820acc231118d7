//! Connection pool, embedded migrations and store bootstrap.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::catalog;
use crate::config::DbConfig;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// The workflow tables, in dependency order: the catalog, then plans, then
/// the rows that reference a plan.
pub const STORE_TABLES: [&str; 4] = [
    "star_systems",
    "science_plans",
    "validation_results",
    "observing_programs",
];

/// What [`prepare_store`] did and what the store now holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    /// Catalog rows inserted by this call; zero on a re-run.
    pub seeded_star_systems: u64,
    /// Row count per entry of [`STORE_TABLES`], same order.
    pub table_counts: Vec<(&'static str, i64)>,
}

pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to plan store at {}", config.database_url))
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to migrate plan store")?;
    info!("plan store schema up to date");
    Ok(())
}

/// Migrate the schema and seed the star catalog. Safe to repeat.
pub async fn prepare_store(pool: &PgPool) -> Result<StoreReport> {
    run_migrations(pool).await?;
    let seeded_star_systems = catalog::seed_star_systems(pool).await?;
    let table_counts = table_counts(pool).await?;
    Ok(StoreReport {
        seeded_star_systems,
        table_counts,
    })
}

/// Create the plan store's database on the server if it is missing.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let db_name = config
        .database_name()
        .context("database URL names no database")?;
    // CREATE DATABASE cannot take a bind parameter.
    if !db_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("database name {db_name:?} contains invalid characters");
    }

    let maintenance_url = config.maintenance_url();
    let server = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&maintenance_url)
        .await
        .with_context(|| format!("failed to reach server at {maintenance_url}"))?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&server)
            .await
            .context("failed to query pg_database")?;

    if !exists {
        server
            .execute(format!("CREATE DATABASE {db_name}").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        info!(db = db_name, "plan store database created");
    }

    server.close().await;
    Ok(())
}

/// Row count of every workflow table, in [`STORE_TABLES`] order.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(STORE_TABLES.len());
    for table in STORE_TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table, count));
    }
    Ok(counts)
}
