//! Database query functions for the `observing_programs` table.

use anyhow::{Context, Result};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{CalibrationUnit, Direction, FoldMirrorType, LightType, ObservingProgram};

/// Parameters for inserting a program. Status starts at `Pending Review`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservingProgram {
    pub plan_id: Uuid,
    pub calibration_unit: CalibrationUnit,
    pub light_type: LightType,
    pub fold_mirror_type: FoldMirrorType,
    pub teleposition_degree: f64,
    pub teleposition_direction: Direction,
}

/// Insert a program row. Returns it with server defaults.
pub async fn insert_program<'e, E>(executor: E, new: &NewObservingProgram) -> Result<ObservingProgram>
where
    E: PgExecutor<'e>,
{
    let program = sqlx::query_as::<_, ObservingProgram>(
        "INSERT INTO observing_programs \
         (plan_id, calibration_unit, light_type, fold_mirror_type, \
          teleposition_degree, teleposition_direction) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.plan_id)
    .bind(new.calibration_unit)
    .bind(new.light_type)
    .bind(new.fold_mirror_type)
    .bind(new.teleposition_degree)
    .bind(new.teleposition_direction)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert program for plan {}", new.plan_id))?;

    Ok(program)
}

/// Fetch a program by its ID.
pub async fn get_program<'e, E>(executor: E, id: Uuid) -> Result<Option<ObservingProgram>>
where
    E: PgExecutor<'e>,
{
    let program =
        sqlx::query_as::<_, ObservingProgram>("SELECT * FROM observing_programs WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .with_context(|| format!("failed to fetch program {id}"))?;

    Ok(program)
}

/// Fetch a program and hold a row lock until the transaction ends.
pub async fn lock_program<'e, E>(executor: E, id: Uuid) -> Result<Option<ObservingProgram>>
where
    E: PgExecutor<'e>,
{
    let program = sqlx::query_as::<_, ObservingProgram>(
        "SELECT * FROM observing_programs WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
    .with_context(|| format!("failed to lock program {id}"))?;

    Ok(program)
}

/// The program derived from a plan, if it has been submitted.
pub async fn get_program_for_plan<'e, E>(
    executor: E,
    plan_id: Uuid,
) -> Result<Option<ObservingProgram>>
where
    E: PgExecutor<'e>,
{
    let program = sqlx::query_as::<_, ObservingProgram>(
        "SELECT * FROM observing_programs WHERE plan_id = $1",
    )
    .bind(plan_id)
    .fetch_optional(executor)
    .await
    .with_context(|| format!("failed to fetch program for plan {plan_id}"))?;

    Ok(program)
}

/// List all programs, most recently submitted first.
pub async fn list_programs<'e, E>(executor: E) -> Result<Vec<ObservingProgram>>
where
    E: PgExecutor<'e>,
{
    let programs = sqlx::query_as::<_, ObservingProgram>(
        "SELECT * FROM observing_programs ORDER BY submitted_at DESC",
    )
    .fetch_all(executor)
    .await
    .context("failed to list programs")?;

    Ok(programs)
}

/// Mark a `Pending Review` program as `Completed`, stamping `completed_at`.
///
/// Returns the updated row, or `None` if it was not pending.
pub async fn complete_program<'e, E>(executor: E, id: Uuid) -> Result<Option<ObservingProgram>>
where
    E: PgExecutor<'e>,
{
    let program = sqlx::query_as::<_, ObservingProgram>(
        "UPDATE observing_programs \
         SET status = 'Completed', completed_at = now() \
         WHERE id = $1 AND status = 'Pending Review' \
         RETURNING *",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
    .with_context(|| format!("failed to complete program {id}"))?;

    Ok(program)
}

/// Remove the program(s) derived from a plan. Only used by the delete cascade.
pub async fn delete_programs_for_plan<'e, E>(executor: E, plan_id: Uuid) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM observing_programs WHERE plan_id = $1")
        .bind(plan_id)
        .execute(executor)
        .await
        .with_context(|| format!("failed to delete programs for plan {plan_id}"))?;

    Ok(result.rows_affected())
}
