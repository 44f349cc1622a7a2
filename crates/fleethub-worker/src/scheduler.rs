//! Cron scheduler for periodic maintenance tasks.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use fleethub_core::error::AppError;

use crate::jobs::SessionSweepJob;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Register the session sweep on a six-field cron expression (seconds first)
    pub async fn register_session_sweep(
        &self,
        schedule: &str,
        job: SessionSweepJob,
    ) -> Result<(), AppError> {
        let cron_job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                tracing::debug!("Running scheduled session sweep");
                job.tick().await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid session sweep schedule '{}': {}",
                schedule, e
            ))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_sweep schedule: {}", e))
        })?;

        tracing::info!(schedule = %schedule, "Registered: session_sweep");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
