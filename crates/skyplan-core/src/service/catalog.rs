//! Read access to the star system catalog.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use skyplan_db::models::StarSystem;
use skyplan_db::queries::star_systems as db;

use crate::error::{Entity, WorkflowError};
use crate::role::{Action, Role, authorize};

/// All star systems, alphabetically.
pub async fn list_star_systems(
    pool: &PgPool,
    claim: Option<Role>,
) -> Result<Vec<StarSystem>, WorkflowError> {
    authorize(claim, Action::View)?;
    Ok(db::list_star_systems(pool).await?)
}

/// Resolve a plan's `star_system` reference, which is either an id or a
/// catalog name.
pub async fn resolve_star_system(
    conn: &mut PgConnection,
    reference: &str,
) -> Result<StarSystem, WorkflowError> {
    let found = match Uuid::parse_str(reference) {
        Ok(id) => db::get_star_system(&mut *conn, id).await?,
        Err(_) => db::find_star_system_by_name(&mut *conn, reference).await?,
    };
    found.ok_or_else(|| WorkflowError::not_found(Entity::StarSystem, reference))
}
