//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use super::{CategoryCard, Layout, ProductCard, report_failure, wishlist_ids};
use crate::catalog::filter_by_category;
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Category grid template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryCard>,
}

/// Products narrowed to one category or brand.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/filtered.html")]
pub struct FilteredProductsTemplate {
    pub layout: Layout,
    pub heading: String,
    /// This page's own path, where card forms return to.
    pub return_path: String,
    pub back_path: &'static str,
    pub back_label: &'static str,
    pub products: Vec<ProductCard>,
}

/// Display every category.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
) -> impl IntoResponse {
    let categories = match state.api().categories().await {
        Ok(categories) => CategoryCard::list(&categories),
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load categories.").await;
            Vec::new()
        }
    };

    CategoriesIndexTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        categories,
    }
}

/// Display products whose category name is exactly `category`.
#[instrument(skip(state, session, user))]
pub async fn products(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Path(category): Path<String>,
) -> impl IntoResponse {
    let products = match state.api().all_products().await {
        Ok(all) => {
            let wishlist = wishlist_ids(&state, &session, &user).await;
            ProductCard::list(&filter_by_category(all, &category), &wishlist)
        }
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load products.").await;
            Vec::new()
        }
    };

    FilteredProductsTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        return_path: format!("/categoryProducts/{}", urlencoding::encode(&category)),
        heading: category,
        back_path: "/categories",
        back_label: "All categories",
        products,
    }
}
