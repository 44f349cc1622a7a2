//! JWT credential encoding, decoding, and digests.

pub mod claims;
pub mod decoder;
pub mod digest;
pub mod encoder;
pub mod error;

pub use claims::{Claims, TokenType};
pub use decoder::JwtDecoder;
pub use digest::token_digest;
pub use encoder::{JwtEncoder, TokenPair};
pub use error::TokenError;
