//! Authentication state.
//!
//! The session holds at most one [`CurrentUser`]; its presence is what
//! "signed in" means. Sign-in and sign-up replace it, sign-out destroys the
//! whole session.

use fresh_cart_core::validation;
use tower_sessions::Session;
use tracing::instrument;

use super::StoreError;
use crate::api::{ApiClient, AuthResponse, SignUpRequest};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, SessionToken, decode_claims, session_keys};

/// Confirmation shown when the server accepts a reset request without a message.
const RESET_SENT: &str = "Reset code sent to your email";

/// Sign-in state and the password reset flow.
pub struct SessionStore<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> SessionStore<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<CurrentUser> {
        restore(self.session).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] without contacting the server when the
    /// form is invalid, or the server's rejection. No token is kept on failure.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, StoreError> {
        validation::sign_in(email, password)?;
        let reply = self.api.sign_in(email.trim(), password).await?;
        self.establish(reply, Some(email.trim())).await
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] without contacting the server when the
    /// form is invalid, or the server's rejection.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest<'_>) -> Result<CurrentUser, StoreError> {
        validation::sign_up(
            request.name,
            request.email,
            request.password,
            request.re_password,
            request.phone,
        )?;
        let trimmed = SignUpRequest {
            name: request.name.trim(),
            email: request.email.trim(),
            phone: request.phone.trim(),
            ..*request
        };
        let reply = self.api.sign_up(&trimmed).await?;
        self.establish(reply, Some(trimmed.email)).await
    }

    /// Destroy the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be updated.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.session.flush().await?;
        clear_sentry_user();
        tracing::info!("User signed out");
        Ok(())
    }

    /// Ask for a reset code and remember which account it is for.
    ///
    /// Returns the server's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for a bad email, or the server's
    /// rejection (e.g. unknown account).
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<String, StoreError> {
        validation::forgot_password(email)?;
        let reply = self.api.forgot_password(email.trim()).await?;
        self.session
            .insert(session_keys::RESET_EMAIL, email.trim())
            .await?;
        Ok(reply.message.unwrap_or_else(|| RESET_SENT.to_string()))
    }

    /// Check an emailed reset code.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for an empty code, or the server's
    /// rejection.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, code: &str) -> Result<(), StoreError> {
        validation::verify_reset_code(code)?;
        let reply = self.api.verify_reset_code(code.trim()).await?;
        tracing::debug!(status = ?reply.status, "Reset code accepted");
        Ok(())
    }

    /// Set a new password. The user still has to sign in afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for bad input, or the server's
    /// rejection.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), StoreError> {
        validation::reset_password(email, new_password)?;
        self.api.reset_password(email.trim(), new_password).await?;
        self.session
            .remove::<String>(session_keys::RESET_EMAIL)
            .await?;
        tracing::info!("Password reset completed");
        Ok(())
    }

    /// Email address of the reset in progress, to prefill the last step.
    pub async fn pending_reset_email(&self) -> Option<String> {
        self.session
            .get::<String>(session_keys::RESET_EMAIL)
            .await
            .ok()
            .flatten()
    }

    async fn establish(
        &self,
        reply: AuthResponse,
        email: Option<&str>,
    ) -> Result<CurrentUser, StoreError> {
        let user = CurrentUser::from_token(SessionToken::new(reply.token))?;

        // Fresh session id on privilege change
        self.session.cycle_id().await?;
        self.session.insert(session_keys::CURRENT_USER, &user).await?;
        self.session.remove::<u32>(session_keys::CART_COUNT).await?;

        set_sentry_user(&user.id, email);
        tracing::info!(user_id = %user.id, role = ?user.role, "User signed in");
        Ok(user)
    }
}

/// Read the signed-in user from the session.
///
/// A stored identity whose token no longer decodes, or has expired, is
/// dropped.
pub async fn restore(session: &Session) -> Option<CurrentUser> {
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    if let Err(e) = decode_claims(user.token().expose()) {
        tracing::warn!(user_id = %user.id, error = %e, "Dropping undecodable session token");
        forget(session).await;
        return None;
    }

    if user.is_expired() {
        tracing::info!(user_id = %user.id, "Session token expired");
        forget(session).await;
        return None;
    }

    Some(user)
}

/// Drop the signed-in user but keep the session (and its notices).
pub async fn forget(session: &Session) {
    if let Err(e) = session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await
    {
        tracing::error!("Failed to clear user from session: {e}");
    }
    if let Err(e) = session.remove::<u32>(session_keys::CART_COUNT).await {
        tracing::error!("Failed to clear cart count from session: {e}");
    }
    clear_sentry_user();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::ApiConfig;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user(exp: i64) -> CurrentUser {
        let token = jsonwebtoken::encode(
            &Header::default(),
            &json!({"id": "u1", "name": "Nour", "exp": exp}),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        CurrentUser::from_token(SessionToken::new(token)).unwrap()
    }

    fn unreachable_api() -> ApiClient {
        // Port 9 (discard) is never served in test environments.
        let mut config = ApiConfig::new("http://127.0.0.1:9").unwrap();
        config.timeout = Duration::from_millis(200);
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_restore_returns_stored_user() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, user(4_102_444_800))
            .await
            .unwrap();
        let restored = restore(&session).await.unwrap();
        assert_eq!(restored.name, "Nour");
    }

    #[tokio::test]
    async fn test_restore_drops_expired_user() {
        let session = session();
        session
            .insert(session_keys::CURRENT_USER, user(1))
            .await
            .unwrap();
        assert!(restore(&session).await.is_none());
        assert!(
            session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_invalid_sign_in_never_reaches_server() {
        let session = session();
        let api = unreachable_api();
        let store = SessionStore::new(&api, &session);

        let err = store.sign_in("not-an-email", "").await.unwrap_err();
        let StoreError::Invalid(errors) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(errors.get("email"), Some("Invalid Email"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert!(store.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_signed_out() {
        let session = session();
        let api = unreachable_api();
        let store = SessionStore::new(&api, &session);

        let err = store
            .sign_in("mona@example.com", "abcABC12")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Api(_)));
        assert!(store.current_user().await.is_none());
    }
}
