//! Database query functions for the `science_plans` table.
//!
//! Status changes go through [`transition_plan_status`] and
//! [`update_plan_fields`], both of which only touch the row while it still
//! holds the status the caller observed. A zero row count means the caller
//! lost a race or the plan is gone.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{FileQuality, FileType, ImageMode, PlanStatus, SciencePlan, TelescopeLocation};

/// Column values for inserting or rewriting a plan. Status and timestamps are
/// owned by the database and the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSciencePlan {
    pub creator: String,
    pub submitter: String,
    pub funding: f64,
    pub objective: String,
    pub star_system_id: Uuid,
    pub schedule_start: DateTime<Utc>,
    pub schedule_end: DateTime<Utc>,
    pub telescope_location: TelescopeLocation,
    pub file_type: FileType,
    pub file_quality: FileQuality,
    pub image_mode: ImageMode,
    pub exposure: i32,
    pub contrast: i32,
    pub brightness: i32,
    pub saturation: i32,
}

/// Insert a new plan in `DRAFT`. Returns the row with server defaults.
pub async fn insert_plan<'e, E>(executor: E, new: &NewSciencePlan) -> Result<SciencePlan>
where
    E: PgExecutor<'e>,
{
    let plan = sqlx::query_as::<_, SciencePlan>(
        "INSERT INTO science_plans \
         (creator, submitter, funding, objective, star_system_id, schedule_start, schedule_end, \
          telescope_location, file_type, file_quality, image_mode, \
          exposure, contrast, brightness, saturation) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING *",
    )
    .bind(&new.creator)
    .bind(&new.submitter)
    .bind(new.funding)
    .bind(&new.objective)
    .bind(new.star_system_id)
    .bind(new.schedule_start)
    .bind(new.schedule_end)
    .bind(new.telescope_location)
    .bind(new.file_type)
    .bind(new.file_quality)
    .bind(new.image_mode)
    .bind(new.exposure)
    .bind(new.contrast)
    .bind(new.brightness)
    .bind(new.saturation)
    .fetch_one(executor)
    .await
    .context("failed to insert science plan")?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan<'e, E>(executor: E, id: Uuid) -> Result<Option<SciencePlan>>
where
    E: PgExecutor<'e>,
{
    let plan = sqlx::query_as::<_, SciencePlan>("SELECT * FROM science_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .with_context(|| format!("failed to fetch plan {id}"))?;

    Ok(plan)
}

/// Fetch a plan and take a row lock held until the transaction ends.
///
/// Concurrent writers on the same plan block here and then see the
/// committed status.
pub async fn lock_plan<'e, E>(executor: E, id: Uuid) -> Result<Option<SciencePlan>>
where
    E: PgExecutor<'e>,
{
    let plan =
        sqlx::query_as::<_, SciencePlan>("SELECT * FROM science_plans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .with_context(|| format!("failed to lock plan {id}"))?;

    Ok(plan)
}

/// Like [`lock_plan`] but with a shared lock: readers that append audit
/// entries may run together, status writers wait for them.
pub async fn lock_plan_shared<'e, E>(executor: E, id: Uuid) -> Result<Option<SciencePlan>>
where
    E: PgExecutor<'e>,
{
    let plan =
        sqlx::query_as::<_, SciencePlan>("SELECT * FROM science_plans WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .with_context(|| format!("failed to lock plan {id}"))?;

    Ok(plan)
}

/// List all plans, newest first.
pub async fn list_plans<'e, E>(executor: E) -> Result<Vec<SciencePlan>>
where
    E: PgExecutor<'e>,
{
    let plans =
        sqlx::query_as::<_, SciencePlan>("SELECT * FROM science_plans ORDER BY created_at DESC")
            .fetch_all(executor)
            .await
            .context("failed to list plans")?;

    Ok(plans)
}

/// List plans currently in `status`, newest first.
pub async fn list_plans_with_status<'e, E>(
    executor: E,
    status: PlanStatus,
) -> Result<Vec<SciencePlan>>
where
    E: PgExecutor<'e>,
{
    let plans = sqlx::query_as::<_, SciencePlan>(
        "SELECT * FROM science_plans WHERE status = $1 ORDER BY created_at DESC",
    )
    .bind(status)
    .fetch_all(executor)
    .await
    .with_context(|| format!("failed to list {status} plans"))?;

    Ok(plans)
}

/// Overwrite a plan's fields and reset it to `DRAFT`, only if it still has
/// status `from`.
///
/// Returns the updated row, or `None` when nothing matched.
pub async fn update_plan_fields<'e, E>(
    executor: E,
    id: Uuid,
    from: PlanStatus,
    new: &NewSciencePlan,
) -> Result<Option<SciencePlan>>
where
    E: PgExecutor<'e>,
{
    let plan = sqlx::query_as::<_, SciencePlan>(
        "UPDATE science_plans SET \
         creator = $3, submitter = $4, funding = $5, objective = $6, star_system_id = $7, \
         schedule_start = $8, schedule_end = $9, telescope_location = $10, file_type = $11, \
         file_quality = $12, image_mode = $13, exposure = $14, contrast = $15, \
         brightness = $16, saturation = $17, status = 'DRAFT', updated_at = now() \
         WHERE id = $1 AND status = $2 \
         RETURNING *",
    )
    .bind(id)
    .bind(from)
    .bind(&new.creator)
    .bind(&new.submitter)
    .bind(new.funding)
    .bind(&new.objective)
    .bind(new.star_system_id)
    .bind(new.schedule_start)
    .bind(new.schedule_end)
    .bind(new.telescope_location)
    .bind(new.file_type)
    .bind(new.file_quality)
    .bind(new.image_mode)
    .bind(new.exposure)
    .bind(new.contrast)
    .bind(new.brightness)
    .bind(new.saturation)
    .fetch_optional(executor)
    .await
    .with_context(|| format!("failed to update plan {id}"))?;

    Ok(plan)
}

/// Move a plan from `from` to `to`, bumping `updated_at`.
///
/// Returns the number of rows affected (0 or 1).
pub async fn transition_plan_status<'e, E>(
    executor: E,
    id: Uuid,
    from: PlanStatus,
    to: PlanStatus,
) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE science_plans SET status = $3, updated_at = now() \
         WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .execute(executor)
    .await
    .with_context(|| format!("failed to move plan {id} from {from} to {to}"))?;

    Ok(result.rows_affected())
}

/// Delete a plan row. Dependent audit and program rows must already be gone.
pub async fn delete_plan<'e, E>(executor: E, id: Uuid) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM science_plans WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .with_context(|| format!("failed to delete plan {id}"))?;

    Ok(result.rows_affected())
}
