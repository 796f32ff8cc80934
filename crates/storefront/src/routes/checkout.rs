//! Checkout route handlers.
//!
//! Payment happens on an external hosted page. The storefront only collects
//! the shipping address, asks the API for a payment session and hands the
//! browser over to it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use fresh_cart_core::validation::ValidationErrors;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, report_failure};
use crate::api::ShippingAddress;
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;
use crate::stores::{CartStore, StoreError};

/// Where the payment page sends the shopper afterwards.
pub const ORDERS_PATH: &str = "/allorders";

/// Shipping address form data.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

impl From<CheckoutForm> for ShippingAddress {
    fn from(form: CheckoutForm) -> Self {
        Self {
            details: form.details.trim().to_string(),
            phone: form.phone.trim().to_string(),
            city: form.city.trim().to_string(),
        }
    }
}

/// Shipping address page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub details: String,
    pub phone: String,
    pub city: String,
    pub errors: ValidationErrors,
}

impl CheckoutTemplate {
    /// Message for a failing field, empty when it passed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> &'static str {
        self.errors.get(field).unwrap_or_default()
    }
}

/// Display the shipping address form.
pub async fn show(session: Session, RequireSession(user): RequireSession) -> impl IntoResponse {
    CheckoutTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        details: String::new(),
        phone: String::new(),
        city: String::new(),
        errors: ValidationErrors::default(),
    }
}

/// Start card payment for the current cart.
///
/// Success answers with a 303 to the hosted payment page. An invalid address
/// re-renders the form; any other failure returns to the cart with a notice.
#[instrument(skip(state, session, user, form), fields(city = %form.city))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let address = ShippingAddress::from(form);
    let return_url = state.config().absolute_url(ORDERS_PATH);
    let mut store = CartStore::new(state.api(), &session, Some(&user));

    match store.checkout(&address, &return_url).await {
        Ok(payment_url) => Redirect::to(&payment_url).into_response(),
        Err(StoreError::Invalid(errors)) => CheckoutTemplate {
            layout: Layout::load(&session, Some(&user)).await,
            details: address.details,
            phone: address.phone,
            city: address.city,
            errors,
        }
        .into_response(),
        Err(e) => {
            report_failure(&session, &e, "Failed to initiate checkout.").await;
            Redirect::to("/cart").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_trimmed() {
        let address = ShippingAddress::from(CheckoutForm {
            details: " 12 Tahrir St ".to_string(),
            phone: "01012345678 ".to_string(),
            city: " Cairo".to_string(),
        });
        assert_eq!(address.details, "12 Tahrir St");
        assert_eq!(address.phone, "01012345678");
        assert_eq!(address.city, "Cairo");
    }
}
