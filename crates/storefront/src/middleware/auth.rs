//! Authentication extractors.
//!
//! Gate handlers on a signed-in user. The identity comes from the session
//! only; no request to the remote API is made here.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentUser;
use crate::stores::session::restore;

/// Where signed-out visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in (or the stored token has expired), the request is
/// answered with a redirect to the login page and the handler never runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn wishlist(RequireSession(user): RequireSession) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireSession(pub CurrentUser);

/// Error returned when a signed-in user is required but absent.
#[derive(Debug)]
pub enum SessionRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSessionLayer,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSessionLayer => {
                tracing::error!("Session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(SessionRejection::MissingSessionLayer)?;

        let user = restore(session).await.ok_or_else(|| {
            tracing::debug!(path = %parts.uri.path(), "Redirecting signed-out visitor to login");
            SessionRejection::RedirectToLogin
        })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireSession`, this never rejects the request.
pub struct OptionalSession(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => restore(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}
