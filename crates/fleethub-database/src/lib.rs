//! # fleethub-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! repositories backing the session store and user lookup.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
