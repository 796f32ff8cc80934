//! Integration tests for Fresh Cart.
//!
//! Each test builds a [`TestContext`]: a fake remote API and a real storefront
//! pointed at it, both bound to ephemeral local ports, plus an HTTP client
//! with a cookie jar that does not follow redirects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fresh-cart-integration-tests
//! ```

#![allow(clippy::expect_used)]

pub mod fake_api;

use fresh_cart_storefront::config::StorefrontConfig;
use fresh_cart_storefront::routes;
use fresh_cart_storefront::state::AppState;
use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect::Policy};

pub use fake_api::{Account, FakeApi};

/// Email of the account every context is seeded with.
pub const SHOPPER_EMAIL: &str = "mona@example.com";

/// Password of the seeded account.
pub const SHOPPER_PASSWORD: &str = "Secret123";

/// A running storefront backed by a fake API.
pub struct TestContext {
    pub api: FakeApi,
    pub shopper: Account,
    pub client: Client,
    pub storefront_url: String,
    pub api_url: String,
}

impl TestContext {
    /// Start a fake API and a storefront in front of it.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot be started.
    pub async fn new() -> Self {
        let api = FakeApi::new();
        let shopper = api.add_account("Mona", SHOPPER_EMAIL, SHOPPER_PASSWORD);
        let api_addr = api.spawn().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let storefront_url = format!(
            "http://{}",
            listener.local_addr().expect("storefront address")
        );

        let api_base_url = format!("http://{api_addr}");
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_BASE_URL" => Some(storefront_url.clone()),
            "STOREFRONT_API_BASE_URL" => Some(api_base_url.clone()),
            "STOREFRONT_STATIC_DIR" => Some(
                concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static").to_string(),
            ),
            _ => None,
        })
        .expect("storefront config");

        let app = routes::app(AppState::new(config).expect("storefront state"));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("HTTP client");

        Self {
            api,
            shopper,
            client,
            storefront_url,
            api_url: api_base_url,
        }
    }

    /// Absolute storefront URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a storefront path.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// GET a storefront path and return the body, asserting a 200.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("response body")
    }

    /// POST a url-encoded form to a storefront path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// Sign in as the seeded shopper, asserting the redirect home.
    pub async fn sign_in(&self) {
        let response = self
            .post_form(
                "/login",
                &[("email", SHOPPER_EMAIL), ("password", SHOPPER_PASSWORD)],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }
}

/// The `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
