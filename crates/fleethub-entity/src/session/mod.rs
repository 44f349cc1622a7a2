//! Session domain entities.

pub mod model;
pub mod projection;
pub mod token;

pub use model::{Admission, NewSession, Session};
pub use projection::SessionProjection;
pub use token::{IssuedTokens, TOKEN_TYPE_BEARER};
