//! Built-in maintenance jobs.

pub mod sweep;

pub use sweep::SessionSweepJob;
