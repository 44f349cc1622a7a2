//! Core type definitions used across the FleetHub workspace.

pub mod session_limit;

pub use session_limit::SessionLimit;
