//! Session sweep job.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, warn};

use fleethub_auth::SessionCleanup;
use fleethub_core::result::AppResult;

/// Runs the session sweep, skipping a tick while the previous run is still going.
#[derive(Debug, Clone)]
pub struct SessionSweepJob {
    /// Sweep implementation.
    cleanup: Arc<SessionCleanup>,
    /// Set while a sweep is in flight.
    running: Arc<AtomicBool>,
}

impl SessionSweepJob {
    /// Create a new sweep job
    pub fn new(cleanup: Arc<SessionCleanup>) -> Self {
        Self {
            cleanup,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one sweep. Returns `None` when a sweep was already in flight.
    pub async fn run(&self) -> AppResult<Option<u64>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Session sweep still running, skipping this tick");
            return Ok(None);
        }

        let result = self.cleanup.run_cleanup().await;
        self.running.store(false, Ordering::Release);
        result.map(Some)
    }

    /// Run one sweep from a scheduler tick, logging instead of returning errors.
    pub async fn tick(&self) {
        match self.run().await {
            Ok(Some(deleted)) => debug!(deleted = deleted, "Session sweep finished"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Session sweep failed"),
        }
    }
}
