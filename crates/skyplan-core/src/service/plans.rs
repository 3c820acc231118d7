//! Science plan operations.

use anyhow::Context;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use skyplan_db::models::{ObservingProgram, PlanStatus, SciencePlan, StarSystem, ValidationResult};
use skyplan_db::queries::{
    plans as plan_db, programs as program_db, star_systems as star_db,
    validation_results as audit_db,
};

use crate::advisor;
use crate::audit::{self, AuditChannel};
use crate::authority::{self, Verdict};
use crate::error::{Entity, WorkflowError};
use crate::fields::{PlanPayload, parse_plan_fields};
use crate::role::{Action, Role, authorize};
use crate::state::PlanStateMachine;

use super::catalog::resolve_star_system;

/// A plan with everything recorded against it.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDetail {
    pub plan: SciencePlan,
    pub star_system: StarSystem,
    /// Audit entries, newest first.
    pub history: Vec<ValidationResult>,
    pub program: Option<ObservingProgram>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatedPlan {
    pub plan: SciencePlan,
    pub verdict: Verdict,
}

/// What a plan deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedPlan {
    pub plan_id: Uuid,
    pub audit_entries: u64,
    pub programs: u64,
}

/// Create a new DRAFT plan.
pub async fn create_plan(
    pool: &PgPool,
    claim: Option<Role>,
    payload: &PlanPayload,
) -> Result<SciencePlan, WorkflowError> {
    let role = authorize(claim, Action::CreatePlan)?;
    let fields = parse_plan_fields(payload).map_err(|violations| WorkflowError::Validation {
        violations,
    })?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let star_system = resolve_star_system(&mut tx, &fields.star_system).await?;
    let plan = plan_db::insert_plan(&mut *tx, &fields.into_new_plan(star_system.id)).await?;
    tx.commit().await.context("failed to commit plan creation")?;

    info!(plan_id = %plan.id, %role, star_system = %star_system.name, "plan created");
    Ok(plan)
}

/// Replace a DRAFT or INVALID plan's fields. The plan returns to DRAFT.
pub async fn edit_plan(
    pool: &PgPool,
    claim: Option<Role>,
    plan_id: Uuid,
    payload: &PlanPayload,
) -> Result<SciencePlan, WorkflowError> {
    let role = authorize(claim, Action::EditPlan)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let current = plan_db::lock_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    PlanStateMachine::guard(Action::EditPlan, &current)?;
    PlanStateMachine::check_transition(
        Action::EditPlan,
        plan_id,
        current.status,
        PlanStatus::Draft,
    )?;

    let fields = parse_plan_fields(payload).map_err(|violations| WorkflowError::Validation {
        violations,
    })?;
    let star_system = resolve_star_system(&mut tx, &fields.star_system).await?;

    let plan = plan_db::update_plan_fields(
        &mut *tx,
        plan_id,
        current.status,
        &fields.into_new_plan(star_system.id),
    )
    .await?
    .ok_or_else(|| WorkflowError::guard(Action::EditPlan, Entity::Plan, plan_id, current.status))?;
    tx.commit().await.context("failed to commit plan edit")?;

    info!(%plan_id, %role, from = %current.status, to = %plan.status, "plan edited");
    Ok(plan)
}

/// Delete a DRAFT or INVALID plan along with its audit entries and programs.
pub async fn delete_plan(
    pool: &PgPool,
    claim: Option<Role>,
    plan_id: Uuid,
) -> Result<DeletedPlan, WorkflowError> {
    let role = authorize(claim, Action::DeletePlan)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let current = plan_db::lock_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    PlanStateMachine::guard(Action::DeletePlan, &current)?;

    // Children first; foreign keys are RESTRICT.
    let audit_entries = audit_db::delete_validation_results_for_plan(&mut *tx, plan_id).await?;
    let programs = program_db::delete_programs_for_plan(&mut *tx, plan_id).await?;
    plan_db::delete_plan(&mut *tx, plan_id).await?;
    tx.commit().await.context("failed to commit plan deletion")?;

    info!(%plan_id, %role, audit_entries, programs, "plan deleted");
    Ok(DeletedPlan {
        plan_id,
        audit_entries,
        programs,
    })
}

/// Run the advisor against a plan and record its messages.
///
/// Status is never changed. The plan is share-locked so an edit cannot land
/// between reading it and recording the advice.
pub async fn simulate_plan(
    pool: &PgPool,
    claim: Option<Role>,
    plan_id: Uuid,
) -> Result<Vec<String>, WorkflowError> {
    let role = authorize(claim, Action::SimulatePlan)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let plan = plan_db::lock_plan_shared(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    PlanStateMachine::guard(Action::SimulatePlan, &plan)?;

    let messages = advisor::simulate(&plan);
    audit::append(&mut tx, plan_id, AuditChannel::Simulation, &messages).await?;
    tx.commit().await.context("failed to commit simulation")?;

    info!(%plan_id, %role, messages = messages.len(), "plan simulated");
    Ok(messages)
}

/// Issue the official verdict on a DRAFT plan, moving it to VALID or INVALID.
pub async fn validate_plan(
    pool: &PgPool,
    claim: Option<Role>,
    plan_id: Uuid,
) -> Result<ValidatedPlan, WorkflowError> {
    let role = authorize(claim, Action::ValidatePlan)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let current = plan_db::lock_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    PlanStateMachine::guard(Action::ValidatePlan, &current)?;

    let verdict = authority::officially_validate(&current);
    let channel = AuditChannel::Official {
        approved: verdict.approved,
    };
    audit::append(&mut tx, plan_id, channel, &verdict.messages).await?;
    PlanStateMachine::transition(
        &mut tx,
        Action::ValidatePlan,
        plan_id,
        current.status,
        verdict.status(),
    )
    .await?;

    let plan = plan_db::get_plan(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    tx.commit().await.context("failed to commit validation")?;

    info!(%plan_id, %role, approved = verdict.approved, status = %plan.status, "plan validated");
    Ok(ValidatedPlan { plan, verdict })
}

/// A plan with its star system, audit history and program.
pub async fn plan_detail(
    pool: &PgPool,
    claim: Option<Role>,
    plan_id: Uuid,
) -> Result<PlanDetail, WorkflowError> {
    authorize(claim, Action::View)?;

    let mut conn = pool.acquire().await.context("failed to acquire connection")?;
    let plan = plan_db::get_plan(&mut *conn, plan_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::Plan, plan_id))?;
    let star_system = star_db::get_star_system(&mut *conn, plan.star_system_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found(Entity::StarSystem, plan.star_system_id))?;
    let history = audit::history(&mut conn, plan_id).await?;
    let program = program_db::get_program_for_plan(&mut *conn, plan_id).await?;

    Ok(PlanDetail {
        plan,
        star_system,
        history,
        program,
    })
}

/// All plans, newest first, optionally filtered by status.
pub async fn list_plans(
    pool: &PgPool,
    claim: Option<Role>,
    status: Option<PlanStatus>,
) -> Result<Vec<SciencePlan>, WorkflowError> {
    authorize(claim, Action::View)?;
    let plans = match status {
        Some(status) => plan_db::list_plans_with_status(pool, status).await?,
        None => plan_db::list_plans(pool).await?,
    };
    Ok(plans)
}
