//! The signed-in user's cart.
//!
//! The cart lives on the server. Each successful read or mutation replaces
//! the local snapshot with the server's reply and records its item count in
//! the session for the navigation badge.

use fresh_cart_core::{CartId, ProductId, short_title};
use tower_sessions::Session;
use tracing::instrument;

use super::StoreError;
use crate::api::{ApiClient, ApiError, Cart, CartResponse, ShippingAddress};
use crate::models::{CurrentUser, SessionToken, session_keys};

const ADDED: &str = "Product added successfully to your cart";

/// Outcome of a quantity change or removal, carrying the item's short title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    Updated(String),
    Removed(String),
}

impl CartChange {
    /// Notification text for the change.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Updated(title) => format!("{title} updated successfully"),
            Self::Removed(title) => format!("{title} removed from cart"),
        }
    }
}

/// Cart operations for one request.
pub struct CartStore<'a> {
    api: &'a ApiClient,
    session: &'a Session,
    token: Option<&'a SessionToken>,
    snapshot: Option<Cart>,
}

impl<'a> CartStore<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, session: &'a Session, user: Option<&'a CurrentUser>) -> Self {
        Self {
            api,
            session,
            token: user.map(CurrentUser::token),
            snapshot: None,
        }
    }

    /// The latest server snapshot, if one was loaded in this request.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Cart> {
        self.snapshot.as_ref()
    }

    /// Load the cart. `None` means the user has no cart on the server yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the snapshot is unchanged.
    #[instrument(skip(self))]
    pub async fn fetch(&mut self) -> Result<Option<&Cart>, StoreError> {
        let token = self.token()?;
        match self.api.cart(token).await {
            Ok(reply) => Ok(Some(self.apply(reply).await)),
            Err(ApiError::NotFound(_)) => {
                self.snapshot = None;
                remember_count(self.session, 0).await;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add one unit of a product. Returns the server's confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the snapshot is unchanged.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add(&mut self, product_id: &ProductId) -> Result<String, StoreError> {
        let token = self.token()?;
        let reply = self.api.add_to_cart(token, product_id).await?;
        let message = reply.message.clone().unwrap_or_else(|| ADDED.to_string());
        self.apply(reply).await;
        Ok(message)
    }

    /// Set a product's quantity. A count of zero removes the line.
    ///
    /// The notice names the product as the server's reply describes it,
    /// falling back to `title` when the line comes back unpopulated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the snapshot is unchanged.
    #[instrument(skip(self, product_id, title), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &mut self,
        product_id: &ProductId,
        count: u32,
        title: &str,
    ) -> Result<CartChange, StoreError> {
        if count == 0 {
            return self.remove(product_id, title).await;
        }
        let token = self.token()?;
        let reply = self
            .api
            .update_cart_quantity(token, product_id, count)
            .await?;
        let cart = self.apply(reply).await;
        let title = cart
            .line_for(product_id)
            .and_then(|line| line.product.populated())
            .map_or(title, |product| product.title.as_str());
        Ok(CartChange::Updated(label(title)))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the snapshot is unchanged.
    #[instrument(skip(self, product_id, title), fields(product_id = %product_id))]
    pub async fn remove(
        &mut self,
        product_id: &ProductId,
        title: &str,
    ) -> Result<CartChange, StoreError> {
        let token = self.token()?;
        let reply = self.api.remove_from_cart(token, product_id).await?;
        self.apply(reply).await;
        Ok(CartChange::Removed(label(title)))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the snapshot is unchanged.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        let token = self.token()?;
        self.api.clear_cart(token).await?;
        self.snapshot = None;
        remember_count(self.session, 0).await;
        Ok(())
    }

    /// Start card checkout and return the hosted payment page URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for a bad address,
    /// [`StoreError::EmptyCart`] when there is nothing to pay for, or the
    /// server's rejection.
    #[instrument(skip(self, address))]
    pub async fn checkout(
        &mut self,
        address: &ShippingAddress,
        return_url: &str,
    ) -> Result<String, StoreError> {
        fresh_cart_core::validation::shipping_address(&address.city, &address.phone)?;
        let token = self.token()?;

        let cart_id = match self.non_empty_cart_id() {
            Some(id) => id,
            None => {
                self.fetch().await?;
                self.non_empty_cart_id().ok_or(StoreError::EmptyCart)?
            }
        };

        let reply = self
            .api
            .checkout_session(token, &cart_id, address, return_url)
            .await?;
        tracing::info!(cart_id = %cart_id, "Checkout session created");
        Ok(reply.session.url)
    }

    fn non_empty_cart_id(&self) -> Option<CartId> {
        self.snapshot
            .as_ref()
            .filter(|cart| !cart.is_empty())
            .map(|cart| cart.id.clone())
    }

    fn token(&self) -> Result<&'a SessionToken, StoreError> {
        self.token.ok_or(StoreError::NotSignedIn)
    }

    async fn apply(&mut self, reply: CartResponse) -> &Cart {
        let cart = Cart::from(reply);
        remember_count(self.session, cart.item_count).await;
        self.snapshot.insert(cart)
    }
}

/// Item count of the most recent cart snapshot, for the navigation badge.
pub async fn cached_count(session: &Session) -> u32 {
    session
        .get::<u32>(session_keys::CART_COUNT)
        .await
        .ok()
        .flatten()
        .unwrap_or(0)
}

async fn remember_count(session: &Session, count: u32) {
    if let Err(e) = session.insert(session_keys::CART_COUNT, count).await {
        tracing::error!("Failed to save cart count to session: {e}");
    }
}

fn label(title: &str) -> String {
    let short = short_title(title);
    if short.is_empty() {
        "Item".to_string()
    } else {
        short
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::ApiConfig;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn api() -> ApiClient {
        ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap()
    }

    #[test]
    fn test_change_messages_use_short_title() {
        assert_eq!(
            CartChange::Updated(label("Woman Shawl Cotton")).message(),
            "Woman Shawl updated successfully"
        );
        assert_eq!(
            CartChange::Removed(label("  ")).message(),
            "Item removed from cart"
        );
    }

    #[tokio::test]
    async fn test_operations_require_sign_in() {
        let session = session();
        let api = api();
        let mut store = CartStore::new(&api, &session, None);

        assert!(matches!(
            store.add(&ProductId::new("p1")).await,
            Err(StoreError::NotSignedIn)
        ));
        assert!(matches!(store.fetch().await, Err(StoreError::NotSignedIn)));
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_checkout_validates_before_network() {
        let session = session();
        let api = api();
        let mut store = CartStore::new(&api, &session, None);
        let address = ShippingAddress {
            details: String::new(),
            phone: "123".to_string(),
            city: String::new(),
        };

        let Err(StoreError::Invalid(errors)) = store.checkout(&address, "http://x").await else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get("city"), Some("City Name is required"));
        assert_eq!(errors.get("phone"), Some("Invalid Phone Number"));
    }

    #[tokio::test]
    async fn test_cached_count_defaults_to_zero() {
        let session = session();
        assert_eq!(cached_count(&session).await, 0);
        remember_count(&session, 3).await;
        assert_eq!(cached_count(&session).await, 3);
    }
}
