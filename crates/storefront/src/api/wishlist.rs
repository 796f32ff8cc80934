//! Wishlist endpoints.

use fresh_cart_core::ProductId;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, ProductRequest, WishlistChange, WishlistResponse};
use crate::models::SessionToken;

impl ApiClient {
    /// Fetch the caller's wishlist with populated products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &SessionToken) -> Result<WishlistResponse, ApiError> {
        let url = self.endpoint("/api/v1/wishlist")?;
        self.send(self.request(Method::GET, url, Some(token))).await
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, product_id), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<WishlistChange, ApiError> {
        let url = self.endpoint("/api/v1/wishlist")?;
        self.send(
            self.request(Method::POST, url, Some(token))
                .json(&ProductRequest { product_id }),
        )
        .await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, product_id), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<WishlistChange, ApiError> {
        let url = self.resource("/api/v1/wishlist", product_id.as_str())?;
        self.send(self.request(Method::DELETE, url, Some(token)))
            .await
    }
}
