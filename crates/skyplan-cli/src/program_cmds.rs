//! CLI handlers for `skyplan program` subcommands.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use skyplan_core::Role;
use skyplan_core::service;
use skyplan_db::models::ObservingProgram;

use crate::ProgramCommands;

pub async fn run_program_command(
    command: ProgramCommands,
    pool: &PgPool,
    role: Option<Role>,
) -> Result<()> {
    match command {
        ProgramCommands::Show { program_id } => match program_id {
            Some(id) => cmd_show_one(pool, role, id).await,
            None => cmd_show_all(pool, role).await,
        },
        ProgramCommands::Execute { program_id } => cmd_execute(pool, role, program_id).await,
    }
}

async fn cmd_show_all(pool: &PgPool, role: Option<Role>) -> Result<()> {
    let programs = service::list_programs(pool, role).await?;

    if programs.is_empty() {
        println!("No programs found. Programs are created by `skyplan plan submit`.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<36}  {:<14}  SUBMITTED",
        "ID", "PLAN", "STATUS"
    );
    for program in &programs {
        println!(
            "{:<36}  {:<36}  {:<14}  {}",
            program.id,
            program.plan_id,
            program.status,
            program.submitted_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

async fn cmd_show_one(pool: &PgPool, role: Option<Role>, program_id: Uuid) -> Result<()> {
    let program = service::get_program(pool, role, program_id).await?;
    print_program(&program);
    Ok(())
}

async fn cmd_execute(pool: &PgPool, role: Option<Role>, program_id: Uuid) -> Result<()> {
    let program = service::execute_program(pool, role, program_id).await?;
    println!("Program executed.");
    println!();
    print_program(&program);
    Ok(())
}

fn print_program(program: &ObservingProgram) {
    println!("  Program ID:    {}", program.id);
    println!("  Plan ID:       {}", program.plan_id);
    println!("  Status:        {}", program.status);
    println!("  Calibration:   {}", program.calibration_unit);
    println!("  Light type:    {}", program.light_type);
    println!("  Fold mirror:   {}", program.fold_mirror_type);
    println!(
        "  Teleposition:  {} deg {}",
        program.teleposition_degree, program.teleposition_direction
    );
    println!(
        "  Submitted:     {}",
        program.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(completed) = program.completed_at {
        println!(
            "  Completed:     {}",
            completed.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
}
