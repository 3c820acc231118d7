mod catalog_cmd;
mod config;
mod payload;
mod plan_cmds;
mod program_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use skyplan_core::WorkflowError;
use skyplan_db::models::PlanStatus;
use skyplan_db::pool;

use config::SkyplanConfig;

#[derive(Parser)]
#[command(name = "skyplan", about = "Role-gated approval workflow for telescope observation plans")]
struct Cli {
    /// Database URL (overrides SKYPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Role to act as: Astronomer, ScienceObserver or TelescopeOperator
    /// (overrides SKYPLAN_ROLE env var)
    #[arg(long, global = true)]
    role: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a skyplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/skyplan")]
        db_url: String,
        /// Default role claim stored under [identity]
        #[arg(long = "default-role")]
        default_role: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the database, then seed the star catalog
    DbInit,
    /// Star system catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Science plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Observing program management
    Program {
        #[command(subcommand)]
        command: ProgramCommands,
    },
    /// Serve the JSON API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all star systems
    List,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a DRAFT plan from a TOML payload file
    Create {
        /// Path to the plan payload file
        file: PathBuf,
    },
    /// Replace the fields of a DRAFT or INVALID plan
    Edit {
        plan_id: Uuid,
        /// Path to the plan payload file
        file: PathBuf,
    },
    /// Show plan details (or list all plans)
    Show {
        /// Plan ID to show (omit to list all)
        plan_id: Option<Uuid>,
        /// Only list plans with this status (DRAFT, INVALID, VALID, SUBMITTED)
        #[arg(long)]
        status: Option<PlanStatus>,
    },
    /// Delete a DRAFT or INVALID plan with its history
    Delete { plan_id: Uuid },
    /// Run advisory checks without changing the plan
    Simulate { plan_id: Uuid },
    /// Issue the official VALID/INVALID verdict
    Validate { plan_id: Uuid },
    /// Submit an observing program for a VALID plan
    Submit {
        plan_id: Uuid,
        /// Path to the program payload file
        program_file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProgramCommands {
    /// Show program details (or list all programs)
    Show {
        /// Program ID to show (omit to list all)
        program_id: Option<Uuid>,
    },
    /// Mark a Pending Review program as Completed
    Execute { program_id: Uuid },
}

/// Execute the `skyplan init` command: write config file.
fn cmd_init(db_url: &str, default_role: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(role) = default_role.as_deref() {
        role.parse::<skyplan_core::Role>()?;
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        identity: config::IdentitySection {
            role: default_role,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    if let Some(role) = &cfg.identity.role {
        println!("  identity.role = {role}");
    }
    println!();
    println!("Next: run `skyplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `skyplan db-init` command: create the database, then prepare the store.
async fn cmd_db_init(resolved: &SkyplanConfig) -> anyhow::Result<()> {
    println!("Initializing skyplan database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Migrate and seed the star catalog.
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let report = pool::prepare_store(&db_pool).await;
    db_pool.close().await;
    let report = report?;

    // 3. Print what the store holds.
    println!("Seeded {} star systems.", report.seeded_star_systems);
    println!("Database ready. Tables:");
    for (table, count) in &report.table_counts {
        println!("  {table}: {count} rows");
    }

    println!("skyplan db-init complete.");
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let resolved = SkyplanConfig::resolve(cli.database_url.as_deref(), cli.role.as_deref());

    match cli.command {
        Commands::Init {
            db_url,
            default_role,
            force,
        } => cmd_init(&db_url, default_role, force),
        Commands::DbInit => cmd_db_init(&resolved).await,
        Commands::Catalog {
            command: CatalogCommands::List,
        } => {
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = catalog_cmd::run_catalog_list(&db_pool, resolved.role).await;
            db_pool.close().await;
            result
        }
        Commands::Plan { command } => {
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool, resolved.role).await;
            db_pool.close().await;
            result
        }
        Commands::Program { command } => {
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = program_cmds::run_program_command(command, &db_pool, resolved.role).await;
            db_pool.close().await;
            result
        }
        Commands::Serve { bind, port } => {
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = serve_cmd::run_serve(db_pool.clone(), &bind, port).await;
            db_pool.close().await;
            result
        }
    }
}

/// Print an error, listing each field violation on its own line.
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<WorkflowError>() {
        Some(WorkflowError::Validation { violations }) => {
            eprintln!("Validation failed:");
            for v in violations {
                eprintln!("  - {v}");
            }
        }
        _ => eprintln!("error: {err:#}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        report_error(&e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_plan_show_with_status_filter() {
        let cli = Cli::try_parse_from(["skyplan", "--role", "astronomer", "plan", "show", "--status", "VALID"])
            .unwrap();
        assert_eq!(cli.role.as_deref(), Some("astronomer"));
        match cli.command {
            Commands::Plan {
                command: PlanCommands::Show { plan_id, status },
            } => {
                assert!(plan_id.is_none());
                assert_eq!(status, Some(PlanStatus::Valid));
            }
            _ => panic!("expected plan show"),
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(Cli::try_parse_from(["skyplan", "plan", "validate", "not-a-uuid"]).is_err());
    }

    #[test]
    fn role_flag_is_global() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["skyplan", "program", "execute", &id, "--role", "TelescopeOperator"])
            .unwrap();
        assert_eq!(cli.role.as_deref(), Some("TelescopeOperator"));
    }
}
