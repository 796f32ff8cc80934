//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//!
//! # Catalog (requires sign-in)
//! GET  /                                - Home: categories and products
//! GET  /products                        - Product grid (?page=N)
//! GET  /productDetails/{id}/{category}  - Product detail and related products
//! GET  /categories                      - Category grid
//! GET  /categoryProducts/{category}     - Products in one category
//! GET  /brands                          - Brand grid
//! GET  /brandsProducts/{brand}          - Products of one brand
//!
//! # Cart (requires sign-in)
//! GET  /cart                            - Cart page
//! POST /cart/add                        - Add one unit
//! POST /cart/update                     - Set quantity (0 removes)
//! POST /cart/remove                     - Remove line
//! POST /cart/clear                      - Empty cart
//! GET  /checkout                        - Shipping address form
//! POST /checkout                        - Redirect to hosted payment page
//!
//! # Wishlist and orders (requires sign-in)
//! GET  /wishlist                        - Wishlist page
//! POST /wishlist/toggle                 - Add or remove
//! POST /wishlist/remove                 - Remove
//! GET  /allorders                       - Order history (?expanded=ID)
//!
//! # Auth
//! GET|POST /login, /signup
//! GET|POST /forgetpassword, /resetcode, /resetpassword
//! POST /logout
//! ```
//!
//! Mutating routes follow post/redirect/get: they queue a notice and send
//! the browser back to a same-origin `redirect_to` path.

pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod wishlist;

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use fresh_cart_core::ProductId;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::Session;

use crate::api::{Category, Product};
use crate::filters;
use crate::middleware::{
    OptionalSession, RequestId, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::stores::{
    Notice, Notices, StoreError, WishlistStore, cart::cached_count, session::forget,
};

// =============================================================================
// Layout
// =============================================================================

/// Data every page's base layout needs.
pub struct Layout {
    pub user_name: Option<String>,
    pub cart_count: u32,
    pub notices: Vec<Notice>,
}

impl Layout {
    /// Build the layout, draining queued notices.
    ///
    /// Call this last in a handler so notices queued while loading the page
    /// are shown on it.
    pub async fn load(session: &Session, user: Option<&CurrentUser>) -> Self {
        let cart_count = match user {
            Some(_) => cached_count(session).await,
            None => 0,
        };
        Self {
            user_name: user.map(|u| u.name.clone()),
            cart_count,
            notices: Notices::new(session).take().await,
        }
    }

    /// Layout for pages rendered without a session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_name: None,
            cart_count: 0,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user_name.is_some()
    }
}

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

// =============================================================================
// Shared Views
// =============================================================================

/// Product card display data for grids.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub rating: String,
    pub in_wishlist: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, wishlist: &HashSet<ProductId>) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            category: product.category.name.clone(),
            image: product.image_cover.clone(),
            price: product.price().to_string(),
            sale_price: product.sale_price().map(|p| p.to_string()),
            rating: format!("{:.1}", product.ratings_average),
            in_wishlist: wishlist.contains(&product.id),
        }
    }

    /// Cards for a list of products.
    #[must_use]
    pub fn list(products: &[Product], wishlist: &HashSet<ProductId>) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, wishlist)).collect()
    }

    /// Link to the product detail page.
    #[must_use]
    pub fn detail_path(&self) -> String {
        detail_path(&self.id, &self.category)
    }
}

/// Category tile display data.
#[derive(Clone)]
pub struct CategoryCard {
    pub name: String,
    pub image: Option<String>,
}

impl CategoryCard {
    #[must_use]
    pub fn list(categories: &[Category]) -> Vec<Self> {
        categories
            .iter()
            .map(|c| Self {
                name: c.name.clone(),
                image: c.image.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn products_path(&self) -> String {
        format!("/categoryProducts/{}", urlencoding::encode(&self.name))
    }
}

/// Path of a product detail page.
#[must_use]
pub fn detail_path(id: &str, category: &str) -> String {
    format!(
        "/productDetails/{}/{}",
        urlencoding::encode(id),
        urlencoding::encode(category)
    )
}

// =============================================================================
// Helpers
// =============================================================================

/// Redirect to `target` if it is a same-origin path, else to `fallback`.
#[must_use]
pub fn redirect_back(target: Option<&str>, fallback: &str) -> Redirect {
    let target = target
        .filter(|t| is_local_path(t))
        .unwrap_or(fallback);
    Redirect::to(target)
}

/// Browsers strip tabs and newlines from URLs, so "/\t/host" would still
/// resolve to another origin.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path
            .chars()
            .any(|c| c == '\\' || c.is_whitespace() || c.is_control())
}

/// Queue the notice for a failed store call.
///
/// A rejected token also signs the user out, so the next gated page sends
/// them to the login form.
pub async fn report_failure(session: &Session, err: &StoreError, fallback: &str) {
    Notices::new(session).failure(err, fallback).await;
    if err.is_unauthenticated() {
        forget(session).await;
    }
}

/// Wishlist membership for product hearts.
///
/// A failed read is reported as a notice and renders every heart empty.
pub async fn wishlist_ids(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> HashSet<ProductId> {
    let mut wishlist = WishlistStore::new(state.api(), Some(user));
    match wishlist.fetch().await {
        Ok(_) => wishlist.member_ids(),
        Err(e) => {
            report_failure(session, &e, "Failed to fetch wishlist.").await;
            HashSet::new()
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/productDetails/{id}/{category}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/categoryProducts/{category}", get(categories::products))
        .route("/brands", get(brands::index))
        .route("/brandsProducts/{brand}", get(brands::products))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/toggle", post(wishlist::toggle))
        .route("/wishlist/remove", post(wishlist::remove))
        .route("/allorders", get(orders::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route(
            "/forgetpassword",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/resetcode",
            get(auth::reset_code_page).post(auth::reset_code),
        )
        .route(
            "/resetpassword",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Build the complete application: pages, static files, health check,
/// fallback and the middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", static_files)
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = RequestId::from_extensions(request.extensions()).unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
            )
        }))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not contact the remote API.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unknown paths.
pub async fn not_found(session: Session, OptionalSession(user): OptionalSession) -> impl IntoResponse {
    let layout = Layout::load(&session, user.as_ref()).await;
    (StatusCode::NOT_FOUND, NotFoundTemplate { layout })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_paths_only() {
        assert!(is_local_path("/cart"));
        assert!(is_local_path("/productDetails/1/Electronics?x=1"));
        assert!(!is_local_path("//evil.example/cart"));
        assert!(!is_local_path("https://evil.example/"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_local_paths_reject_stripped_characters() {
        for target in [
            "/\t/evil.example/",
            "/\n/evil.example/",
            "/\r\n/evil.example/",
            "/ /evil.example/",
            "/\u{0}/evil.example/",
        ] {
            assert!(!is_local_path(target), "{target:?} accepted");
        }
    }

    #[test]
    fn test_detail_path_encodes_category() {
        assert_eq!(
            detail_path("6428ebc6", "Men's Fashion"),
            "/productDetails/6428ebc6/Men%27s%20Fashion"
        );
    }

    #[test]
    fn test_category_card_path() {
        let card = CategoryCard {
            name: "Women's Fashion".to_string(),
            image: None,
        };
        assert_eq!(card.products_path(), "/categoryProducts/Women%27s%20Fashion");
    }
}
