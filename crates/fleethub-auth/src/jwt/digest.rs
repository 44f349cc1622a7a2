//! One-way credential digests used as storage lookup keys.

use sha2::{Digest, Sha256};

/// SHA-256 of the raw credential as 64 lowercase hex characters.
///
/// Only digests are persisted; the raw credential never reaches storage.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
