//! # fleethub-core
//!
//! Core crate for the FleetHub session service. Contains configuration
//! schemas, the unified error system, session limit types, and the
//! session domain events consumed by audit sinks.
//!
//! This crate has **no** internal dependencies on other FleetHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
