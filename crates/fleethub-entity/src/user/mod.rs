//! User identity as seen by the session core.

pub mod model;
pub mod role;

pub use model::{AuthUser, ResolvedIdentity};
pub use role::UserRole;
