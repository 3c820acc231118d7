//! Workflow entry points.
//!
//! Each function takes the caller's role claim, authorizes it, and runs its
//! reads and writes inside one transaction. Mutations lock the target row,
//! check the lifecycle guard against the locked status, and then apply a
//! conditional update. Returning early drops the transaction, which rolls
//! back anything written so far.

pub mod catalog;
pub mod plans;
pub mod programs;

pub use catalog::{list_star_systems, resolve_star_system};
pub use plans::{
    DeletedPlan, PlanDetail, ValidatedPlan, create_plan, delete_plan, edit_plan, list_plans,
    plan_detail, simulate_plan, validate_plan,
};
pub use programs::{execute_program, get_program, list_programs, submit_program};
