//! Side channels fed by the session manager after its writes commit.
//!
//! Delivery is best effort: failures are logged and never roll back or
//! fail the operation that produced them.

pub mod audit;
pub mod eviction;

pub use audit::{AuditSink, TracingAuditSink, emit};
pub use eviction::{EvictionNotice, EvictionNotifier, LogEvictionNotifier, dispatch_eviction};
