//! # fleethub-auth
//!
//! Credential issuance and session lifecycle management for FleetHub.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh credentials and their storage digests
//! - `session`: session storage, the lifecycle manager, and the maintenance sweep
//! - `limiter`: per-user concurrent session cap with oldest-first eviction
//! - `monitor`: read-only metrics, security alerts, and dashboards
//! - `directory`: user lookup for refresh
//! - `notify`: eviction notices and the audit trail

pub mod directory;
pub mod jwt;
pub mod limiter;
pub mod monitor;
pub mod notify;
pub mod session;

pub use directory::{DbUserDirectory, MemoryUserDirectory, UserDirectory};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenError, token_digest};
pub use limiter::{LimitDecision, SessionLimiter};
pub use monitor::SecurityMonitor;
pub use notify::{AuditSink, EvictionNotice, EvictionNotifier, LogEvictionNotifier, TracingAuditSink};
pub use session::{
    IssuedSession, MemorySessionStore, PgSessionStore, SessionCleanup, SessionManager,
    SessionStore,
};
