use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use migrations::Migrator;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use vaultyard_api::{config, db};

#[derive(Debug, Parser)]
#[command(name = "migration", about = "Manage the vaultyard database schema")]
struct Cli {
    /// Database URL; defaults to DATABASE_URL, then to the loaded configuration
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<MigrationCommand>,
}

#[derive(Debug, Subcommand)]
enum MigrationCommand {
    /// Apply pending migrations (default)
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Print applied and pending migrations
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_tracing("info", false);

    let database_url = match cli.database_url {
        Some(url) => url,
        None => match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                config::load_config()
                    .context("failed to load configuration")?
                    .database_url
            }
        },
    };

    let pool = db::establish_connection(&database_url)
        .await
        .context("failed to connect to database")?;

    match cli.command.unwrap_or(MigrationCommand::Up { steps: None }) {
        MigrationCommand::Up { steps } => {
            Migrator::up(&pool, steps).await.context("migration up failed")?;
            info!("Migrations applied");
        }
        MigrationCommand::Down { steps } => {
            Migrator::down(&pool, Some(steps))
                .await
                .context("migration down failed")?;
            info!(steps, "Migrations rolled back");
        }
        MigrationCommand::Status => {
            Migrator::status(&pool).await.context("migration status failed")?;
        }
        MigrationCommand::Fresh => {
            Migrator::fresh(&pool).await.context("migration fresh failed")?;
            info!("Schema recreated");
        }
    }

    Ok(())
}
