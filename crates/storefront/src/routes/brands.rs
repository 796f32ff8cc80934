//! Brand route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use super::categories::FilteredProductsTemplate;
use super::{Layout, ProductCard, report_failure, wishlist_ids};
use crate::api::Brand;
use crate::catalog::filter_by_brand;
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Brand tile display data.
#[derive(Clone)]
pub struct BrandCard {
    pub name: String,
    pub image: Option<String>,
}

impl BrandCard {
    #[must_use]
    pub fn products_path(&self) -> String {
        format!("/brandsProducts/{}", urlencoding::encode(&self.name))
    }
}

impl From<&Brand> for BrandCard {
    fn from(brand: &Brand) -> Self {
        Self {
            name: brand.name.clone(),
            image: brand.image.clone(),
        }
    }
}

/// Brand grid template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/index.html")]
pub struct BrandsIndexTemplate {
    pub layout: Layout,
    pub brands: Vec<BrandCard>,
}

/// Display every brand.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
) -> impl IntoResponse {
    let brands = match state.api().brands().await {
        Ok(brands) => brands.iter().map(BrandCard::from).collect(),
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load brands.").await;
            Vec::new()
        }
    };

    BrandsIndexTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        brands,
    }
}

/// Display products whose brand name is exactly `brand`.
#[instrument(skip(state, session, user))]
pub async fn products(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Path(brand): Path<String>,
) -> impl IntoResponse {
    let products = match state.api().all_products().await {
        Ok(all) => {
            let wishlist = wishlist_ids(&state, &session, &user).await;
            ProductCard::list(&filter_by_brand(all, &brand), &wishlist)
        }
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load products.").await;
            Vec::new()
        }
    };

    FilteredProductsTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        return_path: format!("/brandsProducts/{}", urlencoding::encode(&brand)),
        heading: brand,
        back_path: "/brands",
        back_label: "All brands",
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_path_is_encoded() {
        let card = BrandCard {
            name: "DeFacto & Co".to_string(),
            image: None,
        };
        assert_eq!(card.products_path(), "/brandsProducts/DeFacto%20%26%20Co");
    }
}
