//! Authenticated user identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::UserRole;

/// The slice of a user record the session core needs to issue credentials.
///
/// Provided by the user directory; password and two-factor checks have
/// already passed by the time one of these reaches the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Role at the time of issuance.
    pub role: UserRole,
    /// Owning company (tenant). `None` for platform-level users.
    pub company_id: Option<Uuid>,
}

/// Identity resolved from a validated access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// User ID.
    pub user_id: Uuid,
    /// Login email.
    pub email: String,
    /// Role embedded in the credential.
    pub role: UserRole,
    /// Tenant embedded in the credential.
    pub company_id: Option<Uuid>,
    /// The live session the credential belongs to.
    pub session_id: Uuid,
}
