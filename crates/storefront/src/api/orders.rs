//! Order history and checkout.

use fresh_cart_core::{CartId, UserId};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, CheckoutRequest, CheckoutResponse, Order, ShippingAddress};
use crate::models::SessionToken;

impl ApiClient {
    /// Fetch every order placed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        let url = self.resource("/api/v1/orders/user", user_id.as_str())?;
        self.send(self.request(Method::GET, url, None)).await
    }

    /// Open a hosted card-payment session for a cart.
    ///
    /// The payment page sends the shopper back to `return_url` afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is unknown or the request fails.
    #[instrument(skip(self, token, address), fields(cart_id = %cart_id))]
    pub async fn checkout_session(
        &self,
        token: &SessionToken,
        cart_id: &CartId,
        address: &ShippingAddress,
        return_url: &str,
    ) -> Result<CheckoutResponse, ApiError> {
        let mut url = self.resource("/api/v1/orders/checkout-session", cart_id.as_str())?;
        url.query_pairs_mut().append_pair("url", return_url);
        self.send(
            self.request(Method::POST, url, Some(token))
                .json(&CheckoutRequest {
                    shipping_address: address,
                }),
        )
        .await
    }
}
