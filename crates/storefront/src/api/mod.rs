//! Client for the remote e-commerce REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS via `reqwest`, one method per endpoint
//! - The remote API is the source of truth: no local caching or sync
//! - Authenticated endpoints take the caller's [`SessionToken`], sent in the
//!   custom `token` header
//!
//! Endpoint methods are split by resource:
//!
//! - `auth` - sign-in, sign-up, password reset
//! - `catalog` - products, categories, brands
//! - `cart` - the signed-in user's cart
//! - `wishlist` - the signed-in user's wishlist
//! - `orders` - order history and checkout sessions
//!
//! # Example
//!
//! ```rust,ignore
//! use fresh_cart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let products = client.all_products().await?;
//! let cart = client.add_to_cart(&token, &products[0].id).await?;
//! ```

mod auth;
mod cart;
mod catalog;
mod orders;
pub mod types;
mod wishlist;

pub use types::*;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::models::SessionToken;

/// Header carrying the session token on authenticated requests.
pub const TOKEN_HEADER: &str = "token";

/// Errors that can occur when calling the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The token was missing, expired or rejected.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success reply, with the server's message.
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    /// The server-provided message, when the failure came with one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated(message)
            | Self::NotFound(message)
            | Self::Rejected { message, .. } => Some(message.as_str()),
            Self::Http(_) | Self::Url(_) | Self::Parse(_) => None,
        }
    }

    /// `true` when the failure means the token is no longer usable.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote e-commerce API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fresh-cart-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Absolute URL for an API path such as `/api/v1/cart`.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}{path}", self.inner.base_url))?)
    }

    /// Absolute URL for `{collection}/{id}` with the id percent-encoded.
    fn resource(&self, collection: &str, id: &str) -> Result<Url, ApiError> {
        self.endpoint(&format!("{collection}/{}", urlencoding::encode(id)))
    }

    /// Start a request, attaching the session token when given.
    fn request(&self, method: Method, url: Url, token: Option<&SessionToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.header(TOKEN_HEADER, token.expose()),
            None => builder,
        }
    }

    /// Send a request and decode a successful JSON body.
    ///
    /// Non-success statuses are mapped to [`ApiError`] variants carrying the
    /// server's message.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!(
                status = %status,
                endpoint = %url,
                message = %message,
                "API returned non-success status"
            );
            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiError::Unauthenticated(message),
                StatusCode::NOT_FOUND => ApiError::NotFound(message),
                _ => ApiError::Rejected {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => {
                debug!(endpoint = %url, "API request succeeded");
                Ok(value)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    endpoint = %url,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }
}

/// Extract the most useful message from an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_path() {
        let api = client("https://ecommerce.routemisr.com");
        assert_eq!(
            api.endpoint("/api/v1/cart").unwrap().as_str(),
            "https://ecommerce.routemisr.com/api/v1/cart"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let api = client("http://127.0.0.1:9000/mock/");
        assert_eq!(
            api.endpoint("/api/v1/brands").unwrap().as_str(),
            "http://127.0.0.1:9000/mock/api/v1/brands"
        );
    }

    #[test]
    fn test_resource_encodes_id() {
        let api = client("https://ecommerce.routemisr.com");
        assert_eq!(
            api.resource("/api/v1/products", "a/b c").unwrap().as_str(),
            "https://ecommerce.routemisr.com/api/v1/products/a%2Fb%20c"
        );
    }

    #[test]
    fn test_error_message_from_body() {
        let message = error_message(
            StatusCode::UNAUTHORIZED,
            r#"{"statusMsg":"fail","message":"Incorrect email or password"}"#,
        );
        assert_eq!(message, "Incorrect email or password");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>upstream</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_server_message() {
        let err = ApiError::Rejected {
            status: 409,
            message: "Account Already Exists".into(),
        };
        assert_eq!(err.server_message(), Some("Account Already Exists"));
        assert!(!err.is_unauthenticated());
        assert!(ApiError::Unauthenticated("expired".into()).is_unauthenticated());
    }
}
