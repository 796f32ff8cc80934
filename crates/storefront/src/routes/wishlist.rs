//! Wishlist route handlers.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use fresh_cart_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, ProductCard, redirect_back, report_failure};
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;
use crate::stores::{Notices, WishlistStore};

const WISHLIST_PATH: &str = "/wishlist";
const REMOVE_FAILED: &str = "Failed to delete product from wishlist.";

/// Wishlist mutation form data.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub redirect_to: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub layout: Layout,
    /// `None` when the wishlist could not be loaded.
    pub products: Option<Vec<ProductCard>>,
}

/// Display the wishlist.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
) -> impl IntoResponse {
    let mut store = WishlistStore::new(state.api(), Some(&user));

    let products = match store.fetch().await {
        Ok(items) => {
            let members: HashSet<ProductId> = items.iter().map(|p| p.id.clone()).collect();
            Some(ProductCard::list(items, &members))
        }
        Err(e) => {
            report_failure(&session, &e, "Failed to fetch wishlist.").await;
            None
        }
    };

    WishlistTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        products,
    }
}

/// Flip a product's wishlist membership.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Form(form): Form<WishlistForm>,
) -> Redirect {
    let mut store = WishlistStore::new(state.api(), Some(&user));
    let product_id = ProductId::new(form.product_id);

    match store.toggle(&product_id).await {
        Ok(outcome) => Notices::new(&session).success(outcome.message).await,
        Err(e) => {
            // A failed mutation leaves the pre-toggle snapshot in place.
            let fallback = if store.contains(&product_id) {
                REMOVE_FAILED
            } else {
                "Failed to add product to wishlist."
            };
            report_failure(&session, &e, fallback).await;
        }
    }

    redirect_back(form.redirect_to.as_deref(), WISHLIST_PATH)
}

/// Remove a product from the wishlist.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Form(form): Form<WishlistForm>,
) -> Redirect {
    let mut store = WishlistStore::new(state.api(), Some(&user));

    match store.remove(&ProductId::new(form.product_id)).await {
        Ok(message) => Notices::new(&session).success(message).await,
        Err(e) => report_failure(&session, &e, REMOVE_FAILED).await,
    }

    redirect_back(form.redirect_to.as_deref(), WISHLIST_PATH)
}
