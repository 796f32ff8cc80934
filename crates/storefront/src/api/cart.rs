//! Cart endpoints.
//!
//! Every mutation replies with the full cart document, which callers treat
//! as the new snapshot.

use fresh_cart_core::ProductId;
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use super::{ApiClient, ApiError, CartResponse, CountRequest, ProductRequest};
use crate::models::SessionToken;

/// Reply to clearing the cart.
#[derive(Debug, Deserialize)]
struct ClearedCart {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    /// Fetch the caller's cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the user has no cart yet.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &SessionToken) -> Result<CartResponse, ApiError> {
        let url = self.endpoint("/api/v1/cart")?;
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    /// Add one unit of a product to the cart.
    ///
    /// The reply lists products by id only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, product_id), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<CartResponse, ApiError> {
        let url = self.endpoint("/api/v1/cart")?;
        self.send(
            self.request(Method::POST, url, Some(token))
                .json(&ProductRequest { product_id }),
        )
        .await
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, product_id), fields(product_id = %product_id))]
    pub async fn update_cart_quantity(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
        count: u32,
    ) -> Result<CartResponse, ApiError> {
        let url = self.resource("/api/v1/cart", product_id.as_str())?;
        self.send(
            self.request(Method::PUT, url, Some(token))
                .json(&CountRequest { count }),
        )
        .await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, product_id), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<CartResponse, ApiError> {
        let url = self.resource("/api/v1/cart", product_id.as_str())?;
        self.send(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &SessionToken) -> Result<(), ApiError> {
        let url = self.endpoint("/api/v1/cart")?;
        let reply: ClearedCart = self
            .send(self.request(Method::DELETE, url, Some(token)))
            .await?;
        tracing::debug!(message = ?reply.message, "Cart cleared");
        Ok(())
    }
}
