//! Read-only queries for the `star_systems` catalog.

use anyhow::{Context, Result};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::StarSystem;

/// List the whole catalog, alphabetically.
pub async fn list_star_systems<'e, E>(executor: E) -> Result<Vec<StarSystem>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, StarSystem>("SELECT * FROM star_systems ORDER BY name ASC")
        .fetch_all(executor)
        .await
        .context("failed to list star systems")?;

    Ok(rows)
}

/// Fetch a star system by its ID.
pub async fn get_star_system<'e, E>(executor: E, id: Uuid) -> Result<Option<StarSystem>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, StarSystem>("SELECT * FROM star_systems WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .with_context(|| format!("failed to fetch star system {id}"))?;

    Ok(row)
}

/// Fetch a star system by its exact, unique name.
pub async fn find_star_system_by_name<'e, E>(executor: E, name: &str) -> Result<Option<StarSystem>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, StarSystem>("SELECT * FROM star_systems WHERE name = $1")
        .bind(name)
        .fetch_optional(executor)
        .await
        .with_context(|| format!("failed to look up star system {name:?}"))?;

    Ok(row)
}
