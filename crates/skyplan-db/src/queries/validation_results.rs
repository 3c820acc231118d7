//! Database query functions for the `validation_results` audit log.
//!
//! The log is append-only: there is no update function, and rows are only
//! removed together with their plan.

use anyhow::{Context, Result};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::ValidationResult;

/// Parameters for appending one audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewValidationResult {
    pub plan_id: Uuid,
    /// `Some` only for official validation verdicts.
    pub is_valid: Option<bool>,
    pub message: String,
}

/// Append an audit entry. Returns the row with its id and timestamp.
pub async fn insert_validation_result<'e, E>(
    executor: E,
    new: &NewValidationResult,
) -> Result<ValidationResult>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, ValidationResult>(
        "INSERT INTO validation_results (plan_id, is_valid, message) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(new.plan_id)
    .bind(new.is_valid)
    .bind(&new.message)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to append audit entry for plan {}", new.plan_id))?;

    Ok(row)
}

/// All audit entries for a plan, newest first.
pub async fn list_validation_results<'e, E>(
    executor: E,
    plan_id: Uuid,
) -> Result<Vec<ValidationResult>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ValidationResult>(
        "SELECT * FROM validation_results WHERE plan_id = $1 ORDER BY id DESC",
    )
    .bind(plan_id)
    .fetch_all(executor)
    .await
    .with_context(|| format!("failed to list audit entries for plan {plan_id}"))?;

    Ok(rows)
}

/// Number of audit entries for a plan.
pub async fn count_validation_results<'e, E>(executor: E, plan_id: Uuid) -> Result<i64>
where
    E: PgExecutor<'e>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM validation_results WHERE plan_id = $1")
            .bind(plan_id)
            .fetch_one(executor)
            .await
            .with_context(|| format!("failed to count audit entries for plan {plan_id}"))?;

    Ok(count)
}

/// Remove every audit entry for a plan. Only used by the plan delete cascade.
pub async fn delete_validation_results_for_plan<'e, E>(executor: E, plan_id: Uuid) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM validation_results WHERE plan_id = $1")
        .bind(plan_id)
        .execute(executor)
        .await
        .with_context(|| format!("failed to delete audit entries for plan {plan_id}"))?;

    Ok(result.rows_affected())
}
