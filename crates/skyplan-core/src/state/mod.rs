//! Plan and program lifecycle state machines.
//!
//! The transition graphs and the per-action source-state guards live here.
//! Services call [`PlanStateMachine::guard`] on a locked row and then
//! [`PlanStateMachine::transition`], which only succeeds if the row still
//! has the status the guard saw.

use sqlx::PgConnection;
use tracing::{info, warn};
use uuid::Uuid;

use skyplan_db::models::{ObservingProgram, PlanStatus, ProgramStatus, SciencePlan};
use skyplan_db::queries::plans as db;

use crate::error::{Entity, WorkflowError};
use crate::role::Action;

/// The science plan state machine.
///
/// ```text
/// DRAFT   -> VALID      (official validation)
/// DRAFT   -> INVALID    (official validation)
/// INVALID -> DRAFT      (edit)
/// DRAFT   -> DRAFT      (edit)
/// VALID   -> SUBMITTED  (program submission)
/// ```
pub struct PlanStateMachine;

impl PlanStateMachine {
    pub fn is_valid_transition(from: PlanStatus, to: PlanStatus) -> bool {
        matches!(
            (from, to),
            (PlanStatus::Draft, PlanStatus::Valid)
                | (PlanStatus::Draft, PlanStatus::Invalid)
                | (PlanStatus::Draft, PlanStatus::Draft)
                | (PlanStatus::Invalid, PlanStatus::Draft)
                | (PlanStatus::Valid, PlanStatus::Submitted)
        )
    }

    /// Whether `action` may be applied to a plan in `status`.
    pub fn permits(action: Action, status: PlanStatus) -> bool {
        match action {
            Action::EditPlan | Action::DeletePlan => {
                matches!(status, PlanStatus::Draft | PlanStatus::Invalid)
            }
            Action::SimulatePlan => status != PlanStatus::Submitted,
            Action::ValidatePlan => status == PlanStatus::Draft,
            Action::SubmitProgram => status == PlanStatus::Valid,
            Action::View => true,
            Action::CreatePlan | Action::ExecuteProgram => false,
        }
    }

    pub fn guard(action: Action, plan: &SciencePlan) -> Result<(), WorkflowError> {
        if Self::permits(action, plan.status) {
            return Ok(());
        }
        warn!(plan_id = %plan.id, status = %plan.status, %action, "plan guard rejected");
        Err(WorkflowError::guard(action, Entity::Plan, plan.id, plan.status))
    }

    /// Reject `from -> to` unless it is an edge of the graph.
    ///
    /// Every status write goes through this, including the field update
    /// behind an edit, which always lands in DRAFT.
    pub fn check_transition(
        action: Action,
        plan_id: Uuid,
        from: PlanStatus,
        to: PlanStatus,
    ) -> Result<(), WorkflowError> {
        if Self::is_valid_transition(from, to) {
            return Ok(());
        }
        warn!(%plan_id, %from, %to, %action, "plan transition not in graph");
        Err(WorkflowError::guard(action, Entity::Plan, plan_id, from))
    }

    /// Conditionally move a plan from `from` to `to`.
    ///
    /// Fails with a guard error if the edge is not in the graph or the row no
    /// longer has status `from`.
    pub async fn transition(
        conn: &mut PgConnection,
        action: Action,
        plan_id: Uuid,
        from: PlanStatus,
        to: PlanStatus,
    ) -> Result<(), WorkflowError> {
        Self::check_transition(action, plan_id, from, to)?;

        let rows = db::transition_plan_status(&mut *conn, plan_id, from, to).await?;
        if rows == 0 {
            return match db::get_plan(&mut *conn, plan_id).await? {
                None => Err(WorkflowError::not_found(Entity::Plan, plan_id)),
                Some(current) => {
                    warn!(
                        %plan_id,
                        expected = %from,
                        status = %current.status,
                        "optimistic plan transition lost"
                    );
                    Err(WorkflowError::guard(action, Entity::Plan, plan_id, current.status))
                }
            };
        }

        info!(%plan_id, %from, %to, "plan transitioned");
        Ok(())
    }
}

/// The observing program state machine.
///
/// ```text
/// Pending Review -> Completed  (execution)
/// ```
pub struct ProgramStateMachine;

impl ProgramStateMachine {
    pub fn is_valid_transition(from: ProgramStatus, to: ProgramStatus) -> bool {
        matches!(
            (from, to),
            (ProgramStatus::PendingReview, ProgramStatus::Completed)
        )
    }

    pub fn permits(action: Action, status: ProgramStatus) -> bool {
        match action {
            Action::ExecuteProgram => status == ProgramStatus::PendingReview,
            Action::View => true,
            _ => false,
        }
    }

    pub fn guard(action: Action, program: &ObservingProgram) -> Result<(), WorkflowError> {
        if Self::permits(action, program.status) {
            return Ok(());
        }
        warn!(program_id = %program.id, status = %program.status, %action, "program guard rejected");
        Err(WorkflowError::guard(
            action,
            Entity::Program,
            program.id,
            program.status,
        ))
    }
}
