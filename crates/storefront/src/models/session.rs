//! Session-related types.
//!
//! Types stored in the session for authentication state.

use std::fmt;

use fresh_cart_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::claims::{ClaimsError, decode_claims};

/// Opaque bearer token issued by the remote API at sign-in.
///
/// Kept server-side in the session store and never rendered into pages.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `token` request header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl Serialize for SessionToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for SessionToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Session-stored user identity.
///
/// Present exactly while a token is held; created at sign-in or sign-up and
/// removed at sign-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account id from the token claims.
    pub id: UserId,
    /// Display name from the token claims.
    pub name: String,
    /// Account role, e.g. `user`. Absent from sessions written before it was kept.
    #[serde(default)]
    pub role: Option<String>,
    /// Token expiry, seconds since the epoch.
    pub expires_at: Option<i64>,
    token: SessionToken,
}

impl CurrentUser {
    /// Build the identity for a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token's claims cannot be read.
    pub fn from_token(token: SessionToken) -> Result<Self, ClaimsError> {
        let claims = decode_claims(token.expose())?;
        Ok(Self {
            id: claims.id,
            name: claims.name,
            role: claims.role,
            expires_at: claims.exp,
            token,
        })
    }

    /// The token sent on authenticated API calls.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Whether the token's expiry has passed at `now` (epoch seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the latest cart item count, shown in the navigation bar.
    pub const CART_COUNT: &str = "cart_count";

    /// Key for queued notifications.
    pub const NOTICES: &str = "notices";

    /// Key for the email address of a password reset in progress.
    pub const RESET_EMAIL: &str = "reset_email";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;

    fn token(exp: i64) -> SessionToken {
        SessionToken::new(
            jsonwebtoken::encode(
                &Header::default(),
                &json!({"id": "u-42", "name": "Salma", "role": "user", "exp": exp}),
                &EncodingKey::from_secret(b"k"),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", SessionToken::new("eyJhbGciOi.secret.part"));
        assert_eq!(debug, "SessionToken([REDACTED])");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_current_user_debug_redacts_token() {
        let user = CurrentUser::from_token(token(4_102_444_800)).unwrap();
        let debug = format!("{user:?}");
        assert!(debug.contains("Salma"));
        assert!(!debug.contains(user.token().expose()));
    }

    #[test]
    fn test_current_user_session_round_trip() {
        let user = CurrentUser::from_token(token(4_102_444_800)).unwrap();
        let value = serde_json::to_value(&user).unwrap();
        let restored: CurrentUser = serde_json::from_value(value).unwrap();
        assert_eq!(restored.id, user.id);
        assert_eq!(restored.token().expose(), user.token().expose());
    }

    #[test]
    fn test_current_user_keeps_role() {
        let user = CurrentUser::from_token(token(4_102_444_800)).unwrap();
        assert_eq!(user.role.as_deref(), Some("user"));

        let mut value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "user");
        value.as_object_mut().unwrap().remove("role");
        let restored: CurrentUser = serde_json::from_value(value).unwrap();
        assert_eq!(restored.role, None);
    }

    #[test]
    fn test_expiry() {
        let user = CurrentUser::from_token(token(1_000)).unwrap();
        assert!(user.is_expired_at(1_000));
        assert!(!user.is_expired_at(999));
        assert!(user.is_expired());
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(CurrentUser::from_token(SessionToken::new("nope")).is_err());
    }
}
