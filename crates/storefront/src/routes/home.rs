//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::{CategoryCard, Layout, ProductCard, report_failure, wishlist_ids};
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryCard>,
    pub products: Vec<ProductCard>,
}

/// Display the home page: a category strip above the first page of products.
#[instrument(skip(state, session, user))]
pub async fn home(
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

    let products = match state.api().products(1).await {
        Ok(page) => {
            let wishlist = wishlist_ids(&state, &session, &user).await;
            ProductCard::list(&page.data, &wishlist)
        }
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load products.").await;
            Vec::new()
        }
    };

    HomeTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        categories,
        products,
    }
}
