//! Catalog endpoints: products, categories and brands.
//!
//! The catalog is public; none of these requests carry a token.

use fresh_cart_core::{BrandId, CategoryId, ProductId};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, Brand, Category, Page, Product, Single};

/// Upper bound on pages walked by [`ApiClient::all_products`].
const MAX_PRODUCT_PAGES: u32 = 50;

impl ApiClient {
    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, page: u32) -> Result<Page<Product>, ApiError> {
        let mut url = self.endpoint("/api/v1/products")?;
        if page > 1 {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        self.send(self.request(Method::GET, url, None)).await
    }

    /// Fetch the whole product list, following pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, ApiError> {
        let mut first = self.products(1).await?;
        let mut products = std::mem::take(&mut first.data);
        let mut next = first.metadata.next_page;

        while let Some(page) = next.filter(|p| *p > 1 && *p <= MAX_PRODUCT_PAGES) {
            let mut batch = self.products(page).await?;
            products.append(&mut batch.data);
            next = batch.metadata.next_page.filter(|n| *n > page);
        }

        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.resource("/api/v1/products", id.as_str())?;
        let single: Single<Product> = self.send(self.request(Method::GET, url, None)).await?;
        Ok(single.data)
    }

    /// Fetch every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint("/api/v1/categories")?;
        let page: Page<Category> = self.send(self.request(Method::GET, url, None)).await?;
        Ok(page.data)
    }

    /// Fetch a single category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    #[instrument(skip(self, id), fields(category_id = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let url = self.resource("/api/v1/categories", id.as_str())?;
        let single: Single<Category> = self.send(self.request(Method::GET, url, None)).await?;
        Ok(single.data)
    }

    /// Fetch every brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        let mut url = self.endpoint("/api/v1/brands")?;
        // Brands are paginated in the remote API; one large page covers them all.
        url.query_pairs_mut().append_pair("limit", "100");
        let page: Page<Brand> = self.send(self.request(Method::GET, url, None)).await?;
        Ok(page.data)
    }

    /// Fetch a single brand.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    #[instrument(skip(self, id), fields(brand_id = %id))]
    pub async fn brand(&self, id: &BrandId) -> Result<Brand, ApiError> {
        let url = self.resource("/api/v1/brands", id.as_str())?;
        let single: Single<Brand> = self.send(self.request(Method::GET, url, None)).await?;
        Ok(single.data)
    }
}
