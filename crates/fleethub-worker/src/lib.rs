//! Scheduled maintenance tasks for FleetHub.
//!
//! This crate provides:
//! - A cron scheduler that drives periodic maintenance
//! - The session sweep job that purges long-expired sessions

pub mod jobs;
pub mod scheduler;

pub use jobs::SessionSweepJob;
pub use scheduler::CronScheduler;
