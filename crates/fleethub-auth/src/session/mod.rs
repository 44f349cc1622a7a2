//! Session lifecycle management: storage, issuance, refresh, and cleanup.

pub mod cleanup;
pub mod manager;
pub mod memory;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::{IssuedSession, SessionManager};
pub use memory::MemorySessionStore;
pub use store::{PgSessionStore, SessionStore};
