//! Per-request state containers in front of the remote API.
//!
//! Each store is built from the request's session and the shared
//! [`ApiClient`](crate::api::ApiClient), performs one operation against the
//! remote API, and keeps the server's reply as its snapshot. Nothing is
//! retried: a failed operation leaves the previous snapshot in place and
//! surfaces as a [`StoreError`], which handlers turn into one error notice.
//!
//! - [`SessionStore`] - sign-in, sign-up, sign-out, password reset
//! - [`CartStore`] - the signed-in user's cart
//! - [`WishlistStore`] - the signed-in user's wishlist
//! - [`Notices`] - transient notifications shown on the next rendered page

pub mod cart;
pub mod notice;
pub mod session;
pub mod wishlist;

pub use cart::{CartChange, CartStore};
pub use notice::{Notice, NoticeLevel, Notices};
pub use session::SessionStore;
pub use wishlist::{WishlistStore, WishlistToggle};

use fresh_cart_core::validation::ValidationErrors;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::ClaimsError;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation needs a signed-in user and there is none.
    #[error("You need to be logged in to continue.")]
    NotSignedIn,

    /// Checkout was requested for an empty cart.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// Form input failed validation; nothing was sent.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The token handed out by the server could not be read.
    #[error(transparent)]
    Token(#[from] ClaimsError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl StoreError {
    /// The message to show the user, with `fallback` for failures that have
    /// no better description.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::NotSignedIn | Self::EmptyCart | Self::Invalid(_) => self.to_string(),
            Self::Api(ApiError::Unauthenticated(_)) => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::Api(_) | Self::Token(_) | Self::Session(_) => fallback.to_string(),
        }
    }

    /// The server's own message, for flows that show it verbatim.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api(err) => err.server_message(),
            _ => None,
        }
    }

    /// `true` when the held token is no longer accepted.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthenticated(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_falls_back_for_transport_failures() {
        let err = StoreError::Api(ApiError::Rejected {
            status: 500,
            message: "Internal Server Error".into(),
        });
        assert_eq!(
            err.user_message("Failed to update the cart."),
            "Failed to update the cart."
        );
        assert_eq!(err.server_message(), Some("Internal Server Error"));
    }

    #[test]
    fn test_user_message_for_expired_token() {
        let err = StoreError::Api(ApiError::Unauthenticated("Invalid Token".into()));
        assert!(err.is_unauthenticated());
        assert_eq!(
            err.user_message("ignored"),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_user_message_for_missing_session() {
        assert_eq!(
            StoreError::NotSignedIn.user_message("ignored"),
            "You need to be logged in to continue."
        );
    }
}
