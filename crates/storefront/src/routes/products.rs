//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use fresh_cart_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, ProductCard, detail_path, report_failure, wishlist_ids};
use crate::api::{ApiError, Product};
use crate::catalog::related_products;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;

const PRODUCTS_PATH: &str = "/products";

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub path: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub brand: Option<String>,
    pub images: Vec<String>,
    pub price: String,
    pub sale_price: Option<String>,
    pub rating: String,
    pub ratings_quantity: u32,
    pub in_stock: bool,
    pub in_wishlist: bool,
}

impl ProductDetailView {
    fn new(product: &Product, in_wishlist: bool) -> Self {
        let mut images = vec![product.image_cover.clone()];
        images.extend(
            product
                .images
                .iter()
                .filter(|img| **img != product.image_cover)
                .cloned(),
        );

        Self {
            id: product.id.to_string(),
            path: detail_path(product.id.as_str(), &product.category.name),
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.name.clone(),
            brand: product.brand_name().map(String::from),
            images,
            price: product.price().to_string(),
            sale_price: product.sale_price().map(|p| p.to_string()),
            rating: format!("{:.1}", product.ratings_average),
            ratings_quantity: product.ratings_quantity,
            in_stock: product.quantity > 0,
            in_wishlist,
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCard>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl ProductsIndexTemplate {
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// This page's own path, where card forms return to.
    #[must_use]
    pub fn return_path(&self) -> String {
        format!("/products?page={}", self.current_page)
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductDetailView,
    pub related_products: Vec<ProductCard>,
}

/// Display one page of the product grid.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Query(query): Query<PaginationQuery>,
) -> impl IntoResponse {
    let requested = query.page.unwrap_or(1).max(1);

    let (products, current_page, total_pages) = match state.api().products(requested).await {
        Ok(page) => {
            let wishlist = wishlist_ids(&state, &session, &user).await;
            (
                ProductCard::list(&page.data, &wishlist),
                page.metadata.current_page.max(1),
                page.metadata.number_of_pages.max(1),
            )
        }
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load products.").await;
            (Vec::new(), requested, requested)
        }
    };

    ProductsIndexTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        products,
        current_page,
        total_pages,
    }
}

/// Display product detail page with other products of its category.
///
/// The category segment of the path is informational; related products are
/// matched on the product's own category. An unknown product is a 404; any
/// other failure returns to the product grid with a notice.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Path((id, _category)): Path<(String, String)>,
) -> Result<Response> {
    let product = match state.api().product(&ProductId::new(id.as_str())).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => return Err(AppError::NotFound(format!("product {id}"))),
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load product details.").await;
            return Ok(Redirect::to(PRODUCTS_PATH).into_response());
        }
    };

    let wishlist = wishlist_ids(&state, &session, &user).await;

    let related = match state.api().all_products().await {
        Ok(all) => ProductCard::list(&related_products(all, &product), &wishlist),
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load related products.").await;
            Vec::new()
        }
    };

    Ok(ProductShowTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        product: ProductDetailView::new(&product, wishlist.contains(&product.id)),
        related_products: related,
    }
    .into_response())
}
