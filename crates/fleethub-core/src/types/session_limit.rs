//! Concurrent session limit types.

use serde::{Deserialize, Serialize};

/// Per-user cap on concurrently active sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLimit {
    /// A fixed maximum number of concurrent sessions.
    Fixed(u32),
    /// No cap.
    Unlimited,
}

impl SessionLimit {
    /// Check whether a given active session count is at or over this limit.
    pub fn is_exceeded_by(&self, active_count: usize) -> bool {
        match self {
            Self::Fixed(max) => active_count >= *max as usize,
            Self::Unlimited => false,
        }
    }

    /// Number of existing sessions that must go before one more may be admitted.
    pub fn evictions_needed(&self, active_count: usize) -> usize {
        match self {
            Self::Fixed(max) if self.is_exceeded_by(active_count) => {
                active_count - (*max as usize).saturating_sub(1)
            }
            _ => 0,
        }
    }

    /// True once the next login would hit the cap.
    pub fn is_approached_by(&self, active_count: usize) -> bool {
        match self {
            Self::Fixed(max) => active_count >= (*max as usize).saturating_sub(1),
            Self::Unlimited => false,
        }
    }
}

impl From<u32> for SessionLimit {
    /// Convert a `u32` to a `SessionLimit`. `0` means unlimited.
    fn from(value: u32) -> Self {
        if value == 0 {
            Self::Unlimited
        } else {
            Self::Fixed(value)
        }
    }
}
