//! The signed-in user's wishlist.
//!
//! Add and remove replies only list product ids, so after either the store
//! re-reads the full wishlist to keep its snapshot populated.

use std::collections::HashSet;

use fresh_cart_core::ProductId;
use tracing::instrument;

use super::StoreError;
use crate::api::{ApiClient, Product};
use crate::models::{CurrentUser, SessionToken};

const ADDED: &str = "Product added successfully to your wishlist";
const REMOVED: &str = "Product removed from wishlist successfully";

/// Outcome of a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistToggle {
    /// Whether the product is on the wishlist afterwards.
    pub member: bool,
    pub message: String,
}

/// Wishlist operations for one request.
pub struct WishlistStore<'a> {
    api: &'a ApiClient,
    token: Option<&'a SessionToken>,
    items: Option<Vec<Product>>,
}

impl<'a> WishlistStore<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, user: Option<&'a CurrentUser>) -> Self {
        Self {
            api,
            token: user.map(CurrentUser::token),
            items: None,
        }
    }

    /// The loaded wishlist, if it was read in this request.
    #[must_use]
    pub fn items(&self) -> Option<&[Product]> {
        self.items.as_deref()
    }

    /// Load the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the snapshot is unchanged.
    #[instrument(skip(self))]
    pub async fn fetch(&mut self) -> Result<&[Product], StoreError> {
        let token = self.token()?;
        let reply = self.api.wishlist(token).await?;
        Ok(self.items.insert(reply.data).as_slice())
    }

    /// Whether `product_id` is on the loaded wishlist.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items
            .as_deref()
            .is_some_and(|items| items.iter().any(|p| &p.id == product_id))
    }

    /// Ids of every product on the loaded wishlist.
    #[must_use]
    pub fn member_ids(&self) -> HashSet<ProductId> {
        self.items
            .iter()
            .flatten()
            .map(|p| p.id.clone())
            .collect()
    }

    /// Add a product. Returns the server's confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add(&mut self, product_id: &ProductId) -> Result<String, StoreError> {
        let token = self.token()?;
        let reply = self.api.add_to_wishlist(token, product_id).await?;
        self.refresh().await;
        Ok(reply.message.unwrap_or_else(|| ADDED.to_string()))
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<String, StoreError> {
        let token = self.token()?;
        self.api.remove_from_wishlist(token, product_id).await?;
        self.refresh().await;
        Ok(REMOVED.to_string())
    }

    /// Add the product if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the current membership or the mutation
    /// fails.
    pub async fn toggle(&mut self, product_id: &ProductId) -> Result<WishlistToggle, StoreError> {
        if self.items.is_none() {
            self.fetch().await?;
        }

        if self.contains(product_id) {
            let message = self.remove(product_id).await?;
            Ok(WishlistToggle {
                member: false,
                message,
            })
        } else {
            let message = self.add(product_id).await?;
            Ok(WishlistToggle {
                member: true,
                message,
            })
        }
    }

    /// Re-read after a successful mutation. A failed re-read only clears the
    /// snapshot; the mutation itself stands.
    async fn refresh(&mut self) {
        if let Err(e) = self.fetch().await {
            tracing::warn!(error = %e, "Failed to refresh wishlist after change");
            self.items = None;
        }
    }

    fn token(&self) -> Result<&'a SessionToken, StoreError> {
        self.token.ok_or(StoreError::NotSignedIn)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[tokio::test]
    async fn test_signed_out_wishlist_is_rejected_and_empty() {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let mut store = WishlistStore::new(&api, None);

        assert!(matches!(
            store.toggle(&ProductId::new("p1")).await,
            Err(StoreError::NotSignedIn)
        ));
        assert!(!store.contains(&ProductId::new("p1")));
        assert!(store.member_ids().is_empty());
        assert!(store.items().is_none());
    }
}
