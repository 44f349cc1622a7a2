//! # fleethub-entity
//!
//! Domain entity models for the FleetHub session service. Persisted
//! entities derive `sqlx::FromRow`; derived views (metrics, alerts,
//! dashboards) are plain serializable values computed on demand.

pub mod security;
pub mod session;
pub mod user;
