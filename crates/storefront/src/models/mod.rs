//! Domain models for storefront.
//!
//! Identity is owned by the remote API: the storefront only keeps the
//! bearer token it was handed and what can be read from it.

pub mod claims;
pub mod session;

pub use claims::{ClaimsError, TokenClaims, decode_claims};
pub use session::{CurrentUser, SessionToken, keys as session_keys};
