//! CLI handlers for `skyplan plan` subcommands.
//!
//! Implements:
//! - `skyplan plan create <file>`             -- create a DRAFT plan from a payload file
//! - `skyplan plan edit <plan-id> <file>`     -- replace a plan's fields
//! - `skyplan plan show [plan-id]`            -- show one plan or list all
//! - `skyplan plan delete <plan-id>`          -- delete a plan and its records
//! - `skyplan plan simulate <plan-id>`        -- run the advisor
//! - `skyplan plan validate <plan-id>`        -- issue the official verdict
//! - `skyplan plan submit <plan-id> <file>`   -- submit an observing program

use std::path::Path;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use skyplan_core::Role;
use skyplan_core::fields::{PlanPayload, ProgramPayload};
use skyplan_core::service;
use skyplan_db::models::{PlanStatus, SciencePlan};

use crate::PlanCommands;
use crate::payload::load_payload;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    pool: &PgPool,
    role: Option<Role>,
) -> Result<()> {
    match command {
        PlanCommands::Create { file } => cmd_create(pool, role, &file).await,
        PlanCommands::Edit { plan_id, file } => cmd_edit(pool, role, plan_id, &file).await,
        PlanCommands::Show { plan_id, status } => match plan_id {
            Some(id) => cmd_show_one(pool, role, id).await,
            None => cmd_show_all(pool, role, status).await,
        },
        PlanCommands::Delete { plan_id } => cmd_delete(pool, role, plan_id).await,
        PlanCommands::Simulate { plan_id } => cmd_simulate(pool, role, plan_id).await,
        PlanCommands::Validate { plan_id } => cmd_validate(pool, role, plan_id).await,
        PlanCommands::Submit {
            plan_id,
            program_file,
        } => cmd_submit(pool, role, plan_id, &program_file).await,
    }
}

// -----------------------------------------------------------------------
// skyplan plan create / edit
// -----------------------------------------------------------------------

async fn cmd_create(pool: &PgPool, role: Option<Role>, file: &Path) -> Result<()> {
    let payload: PlanPayload = load_payload(file)?;
    let plan = service::create_plan(pool, role, &payload).await?;

    println!("Plan created.");
    println!();
    print_summary(&plan);
    println!();
    println!("Next: `skyplan plan simulate {}` to check it.", plan.id);
    Ok(())
}

async fn cmd_edit(pool: &PgPool, role: Option<Role>, plan_id: Uuid, file: &Path) -> Result<()> {
    let payload: PlanPayload = load_payload(file)?;
    let plan = service::edit_plan(pool, role, plan_id, &payload).await?;

    println!("Plan updated.");
    println!();
    print_summary(&plan);
    Ok(())
}

// -----------------------------------------------------------------------
// skyplan plan show
// -----------------------------------------------------------------------

async fn cmd_show_all(pool: &PgPool, role: Option<Role>, status: Option<PlanStatus>) -> Result<()> {
    let plans = service::list_plans(pool, role, status).await?;

    if plans.is_empty() {
        println!("No plans found. Use `skyplan plan create <file>` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let status_w = 9;
    let creator_w = plans
        .iter()
        .map(|p| p.creator.chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    println!(
        "{:<id_w$}  {:<status_w$}  {:<creator_w$}  {:>3}  CREATED",
        "ID", "STATUS", "CREATOR", "EXP",
    );
    for plan in &plans {
        println!(
            "{:<id_w$}  {:<status_w$}  {:<creator_w$}  {:>3}  {}",
            plan.id,
            plan.status,
            plan.creator,
            plan.exposure,
            plan.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

async fn cmd_show_one(pool: &PgPool, role: Option<Role>, plan_id: Uuid) -> Result<()> {
    let detail = service::plan_detail(pool, role, plan_id).await?;
    let plan = &detail.plan;

    print_summary(plan);
    println!("  Submitter:     {}", plan.submitter);
    println!("  Objective:     {}", plan.objective);
    println!("  Funding:       {:.2}", plan.funding);
    println!(
        "  Star system:   {} ({})",
        detail.star_system.name, detail.star_system.meaning
    );
    println!(
        "  Schedule:      {} .. {}",
        plan.schedule_start.format("%Y-%m-%d %H:%M UTC"),
        plan.schedule_end.format("%Y-%m-%d %H:%M UTC"),
    );
    println!(
        "  Telescope:     {}  {} / {} / {}",
        plan.telescope_location, plan.file_type, plan.file_quality, plan.image_mode
    );
    println!(
        "  Dials:         exposure {}  contrast {}  brightness {}  saturation {}",
        plan.exposure, plan.contrast, plan.brightness, plan.saturation
    );

    if let Some(program) = &detail.program {
        println!();
        println!("Program {} ({})", program.id, program.status);
    }

    if !detail.history.is_empty() {
        println!();
        println!("History (newest first):");
        for entry in &detail.history {
            let verdict = match entry.is_valid {
                Some(true) => "approved",
                Some(false) => "rejected",
                None => "advice",
            };
            println!(
                "  {}  {:<8}  {}",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                verdict,
                entry.message
            );
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// skyplan plan delete / simulate / validate / submit
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &PgPool, role: Option<Role>, plan_id: Uuid) -> Result<()> {
    let deleted = service::delete_plan(pool, role, plan_id).await?;
    println!(
        "Plan {} deleted ({} audit entries, {} programs removed).",
        deleted.plan_id, deleted.audit_entries, deleted.programs
    );
    Ok(())
}

async fn cmd_simulate(pool: &PgPool, role: Option<Role>, plan_id: Uuid) -> Result<()> {
    let messages = service::simulate_plan(pool, role, plan_id).await?;
    println!("Simulation of plan {plan_id}:");
    for message in &messages {
        println!("  - {message}");
    }
    Ok(())
}

async fn cmd_validate(pool: &PgPool, role: Option<Role>, plan_id: Uuid) -> Result<()> {
    let result = service::validate_plan(pool, role, plan_id).await?;
    println!("Plan {plan_id} is now {}.", result.plan.status);
    for message in &result.verdict.messages {
        println!("  - {message}");
    }
    Ok(())
}

async fn cmd_submit(
    pool: &PgPool,
    role: Option<Role>,
    plan_id: Uuid,
    program_file: &Path,
) -> Result<()> {
    let payload: ProgramPayload = load_payload(program_file)?;
    let program = service::submit_program(pool, role, plan_id, &payload).await?;
    println!("Plan {plan_id} submitted.");
    println!("  Program ID:  {}", program.id);
    println!("  Status:      {}", program.status);
    Ok(())
}

fn print_summary(plan: &SciencePlan) {
    println!("  Plan ID:       {}", plan.id);
    println!("  Status:        {}", plan.status);
    println!("  Creator:       {}", plan.creator);
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use skyplan_db::queries::plans as plan_db;
    use skyplan_test_utils::{create_seeded_test_db, drop_test_db};

    use super::*;

    const PLAN_TOML: &str = r#"
creator = "V. Rubin"
submitter = "M. Keck"
funding = 2000
objective = "Rotation curve of M31"
star_system = "Andromeda"
schedule_start = "2026-11-02T20:00"
schedule_end = "2026-11-03T02:00"
telescope_location = "Hawaii"
file_type = "PNG"
file_quality = "Fine"
image_mode = "Color"
exposure = 30
contrast = 10
brightness = 10
saturation = 10
"#;

    const PROGRAM_TOML: &str = r#"
calibration_unit = "Argon"
light_type = "CerroPachonSkyEmission"
fold_mirror_type = "REFLECTIVE_CONVERGING_BEAM"
teleposition_degree = 270
teleposition_direction = "West"
"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn full_lifecycle_through_commands() {
        let (pool, db_name) = create_seeded_test_db().await;
        let astronomer = Some(Role::Astronomer);
        let plan_file = write_temp(PLAN_TOML);
        let program_file = write_temp(PROGRAM_TOML);

        run_plan_command(
            PlanCommands::Create {
                file: plan_file.path().to_path_buf(),
            },
            &pool,
            astronomer,
        )
        .await
        .unwrap();
        let plan = plan_db::list_plans(&pool).await.unwrap().remove(0);
        assert_eq!(plan.status, PlanStatus::Draft);

        for command in [
            PlanCommands::Simulate { plan_id: plan.id },
            PlanCommands::Show {
                plan_id: Some(plan.id),
                status: None,
            },
            PlanCommands::Show {
                plan_id: None,
                status: Some(PlanStatus::Draft),
            },
        ] {
            run_plan_command(command, &pool, astronomer).await.unwrap();
        }

        run_plan_command(
            PlanCommands::Validate { plan_id: plan.id },
            &pool,
            Some(Role::ScienceObserver),
        )
        .await
        .unwrap();

        run_plan_command(
            PlanCommands::Submit {
                plan_id: plan.id,
                program_file: program_file.path().to_path_buf(),
            },
            &pool,
            astronomer,
        )
        .await
        .unwrap();

        let after = plan_db::get_plan(&pool, plan.id).await.unwrap().unwrap();
        assert_eq!(after.status, PlanStatus::Submitted);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn wrong_role_surfaces_workflow_error() {
        let (pool, db_name) = create_seeded_test_db().await;
        let plan_file = write_temp(PLAN_TOML);

        let err = run_plan_command(
            PlanCommands::Create {
                file: plan_file.path().to_path_buf(),
            },
            &pool,
            Some(Role::TelescopeOperator),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<skyplan_core::WorkflowError>(),
            Some(skyplan_core::WorkflowError::Unauthorized { .. })
        ));
        assert!(plan_db::list_plans(&pool).await.unwrap().is_empty());

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn edit_and_delete_through_commands() {
        let (pool, db_name) = create_seeded_test_db().await;
        let astronomer = Some(Role::Astronomer);
        let plan_file = write_temp(PLAN_TOML);
        let edited_file = write_temp(&PLAN_TOML.replace("exposure = 30", "exposure = 12"));

        run_plan_command(
            PlanCommands::Create {
                file: plan_file.path().to_path_buf(),
            },
            &pool,
            astronomer,
        )
        .await
        .unwrap();
        let plan = plan_db::list_plans(&pool).await.unwrap().remove(0);

        run_plan_command(
            PlanCommands::Edit {
                plan_id: plan.id,
                file: edited_file.path().to_path_buf(),
            },
            &pool,
            astronomer,
        )
        .await
        .unwrap();
        let edited = plan_db::get_plan(&pool, plan.id).await.unwrap().unwrap();
        assert_eq!(edited.exposure, 12);

        run_plan_command(PlanCommands::Delete { plan_id: plan.id }, &pool, astronomer)
            .await
            .unwrap();
        assert!(plan_db::get_plan(&pool, plan.id).await.unwrap().is_none());

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
