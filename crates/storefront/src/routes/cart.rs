//! Cart route handlers.
//!
//! Every mutation is a plain form POST. The handler applies it through the
//! [`CartStore`], queues the resulting notice and redirects back to the page
//! the form was on.

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

use super::{Layout, detail_path, redirect_back, report_failure};
use crate::api::{Cart, CartLine};
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;
use crate::stores::{CartStore, Notices};

const CART_PATH: &str = "/cart";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub detail_path: Option<String>,
    pub count: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let product = line.product.populated();
        Self {
            product_id: line.product.id().to_string(),
            title: product.map_or_else(String::new, |p| p.title.clone()),
            image: product.map(|p| p.image_cover.clone()),
            category: product.map(|p| p.category.name.clone()),
            detail_path: product.map(|p| detail_path(p.id.as_str(), &p.category.name)),
            count: line.count,
            price: line.unit_price().to_string(),
            line_price: line.line_price().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub redirect_to: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub count: u32,
    #[serde(default)]
    pub title: String,
    pub redirect_to: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    pub redirect_to: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    /// `None` when the cart could not be loaded.
    pub cart: Option<CartView>,
}

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
) -> impl IntoResponse {
    let mut store = CartStore::new(state.api(), &session, Some(&user));

    let cart = match store.fetch().await {
        Ok(Some(cart)) => Some(CartView::from(cart)),
        Ok(None) => Some(CartView {
            items: Vec::new(),
            total: fresh_cart_core::Price::zero().to_string(),
            item_count: 0,
        }),
        Err(e) => {
            report_failure(&session, &e, "Failed to retrieve cart items.").await;
            None
        }
    };

    CartShowTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        cart,
    }
}

/// Add one unit of a product.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let mut store = CartStore::new(state.api(), &session, Some(&user));

    match store.add(&ProductId::new(form.product_id)).await {
        Ok(message) => Notices::new(&session).success(message).await,
        Err(e) => report_failure(&session, &e, "Failed to add product to cart.").await,
    }

    redirect_back(form.redirect_to.as_deref(), CART_PATH)
}

/// Set a line's quantity. A count of zero removes the line.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id, count = form.count))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    let mut store = CartStore::new(state.api(), &session, Some(&user));

    match store
        .update_quantity(&ProductId::new(form.product_id), form.count, &form.title)
        .await
    {
        Ok(change) => Notices::new(&session).success(change.message()).await,
        Err(e) => report_failure(&session, &e, "Failed to update the cart.").await,
    }

    redirect_back(form.redirect_to.as_deref(), CART_PATH)
}

/// Remove a line.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    let mut store = CartStore::new(state.api(), &session, Some(&user));

    match store
        .remove(&ProductId::new(form.product_id), &form.title)
        .await
    {
        Ok(change) => Notices::new(&session).success(change.message()).await,
        Err(e) => report_failure(&session, &e, "Failed to remove the item from the cart.").await,
    }

    redirect_back(form.redirect_to.as_deref(), CART_PATH)
}

/// Empty the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
) -> Redirect {
    let mut store = CartStore::new(state.api(), &session, Some(&user));

    match store.clear().await {
        Ok(()) => Notices::new(&session).success("Cart cleared").await,
        Err(e) => report_failure(&session, &e, "Failed to clear the cart.").await,
    }

    Redirect::to(CART_PATH)
}
