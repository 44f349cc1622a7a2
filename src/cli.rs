//! CLI command definitions and dispatch.

use clap::{Parser, Subcommand};
use uuid::Uuid;

use fleethub_core::config::AppConfig;
use fleethub_core::error::AppError;
use fleethub_database::migration::run_migrations;
use fleethub_worker::CronScheduler;

use crate::app::AppContext;

/// FleetHub: session lifecycle service
#[derive(Debug, Parser)]
#[command(name = "fleethub", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run migrations, then the maintenance scheduler until Ctrl-C
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Run one bounded maintenance sweep and exit
    Sweep,
    /// Revoke every active session of a user
    RevokeAll {
        /// The user whose sessions are revoked
        user_id: Uuid,
    },
}

impl Cli {
    /// Execute the selected command
    pub async fn execute(self, config: AppConfig) -> Result<(), AppError> {
        let ctx = AppContext::build(&config).await?;

        let result = match self.command {
            Commands::Serve => serve(&ctx, &config).await,
            Commands::Migrate => {
                run_migrations(ctx.db.pool()).await?;
                tracing::info!("Migrations applied");
                Ok(())
            }
            Commands::Sweep => {
                let deleted = ctx.cleanup.run_cleanup().await?;
                tracing::info!(deleted = deleted, "Sweep complete");
                Ok(())
            }
            Commands::RevokeAll { user_id } => {
                let revoked = ctx.manager.revoke_all_sessions(user_id).await?;
                tracing::info!(user_id = %user_id, revoked = revoked, "Sessions revoked");
                Ok(())
            }
        };

        ctx.db.close().await;
        result
    }
}

async fn serve(ctx: &AppContext, config: &AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FleetHub v{}", env!("CARGO_PKG_VERSION"));

    run_migrations(ctx.db.pool()).await?;
    tracing::info!("Database migrations complete");

    let mut scheduler = CronScheduler::new().await?;
    scheduler
        .register_session_sweep(&config.session.sweep_schedule, ctx.sweep_job())
        .await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {}", e)))?;
    tracing::info!("Shutdown signal received");

    scheduler.shutdown().await?;
    Ok(())
}
