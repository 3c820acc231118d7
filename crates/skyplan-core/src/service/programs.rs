//! Observing program operations.

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use skyplan_db::models::{ObservingProgram, PlanStatus, ProgramStatus};
use skyplan_db::queries::{plans as plan_db, programs as program_db};

use crate::error::{Entity, WorkflowError};
use crate::fields::{ProgramPayload, parse_program_fields};
use crate::role::{Action, Role, authorize};
use crate::state::{PlanStateMachine, ProgramStateMachine};

/// Create the observing program for a VALID plan and mark the plan SUBMITTED.
///
/// Both writes commit together or not at all.
pub async fn submit_program(
    pool: &PgPool,
    claim: Option<Role>,
    plan_id: Uuid,
    payload: &ProgramPayload,
) -> Result<ObservingProgram, WorkflowError> {
    let role = authorize(claim, Action::SubmitProgram)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    // 1. Lock the plan and check it is VALID.
    let plan = plan_db::lock_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    PlanStateMachine::guard(Action::SubmitProgram, &plan)?;

    // 2. Validate the program payload.
    let fields = parse_program_fields(payload).map_err(|violations| {
        WorkflowError::Validation { violations }
    })?;

    // 3. Insert the program and close the plan.
    let program = program_db::insert_program(&mut *tx, &fields.into_new_program(plan_id)).await?;
    PlanStateMachine::transition(
        &mut tx,
        Action::SubmitProgram,
        plan_id,
        plan.status,
        PlanStatus::Submitted,
    )
    .await?;

    tx.commit().await.context("failed to commit program submission")?;

    info!(%plan_id, program_id = %program.id, %role, "program submitted");
    Ok(program)
}

/// Mark a Pending Review program as Completed.
pub async fn execute_program(
    pool: &PgPool,
    claim: Option<Role>,
    program_id: Uuid,
) -> Result<ObservingProgram, WorkflowError> {
    let role = authorize(claim, Action::ExecuteProgram)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let current = program_db::lock_program(&mut *tx, program_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Program, program_id))?;
    ProgramStateMachine::guard(Action::ExecuteProgram, &current)?;

    let program = program_db::complete_program(&mut *tx, program_id)
        .await?
        .ok_or_else(|| {
            WorkflowError::guard(
                Action::ExecuteProgram,
                Entity::Program,
                program_id,
                ProgramStatus::Completed,
            )
        })?;
    tx.commit().await.context("failed to commit program execution")?;

    info!(%program_id, plan_id = %program.plan_id, %role, "program executed");
    Ok(program)
}

pub async fn get_program(
    pool: &PgPool,
    claim: Option<Role>,
    program_id: Uuid,
) -> Result<ObservingProgram, WorkflowError> {
    authorize(claim, Action::View)?;
    program_db::get_program(pool, program_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Program, program_id))
}

/// All programs, most recently submitted first.
pub async fn list_programs(
    pool: &PgPool,
    claim: Option<Role>,
) -> Result<Vec<ObservingProgram>, WorkflowError> {
    authorize(claim, Action::View)?;
    Ok(program_db::list_programs(pool).await?)
}
