//! Integration tests for the home page, product pages, categories and brands.

#![allow(clippy::unwrap_used)]

use fresh_cart_integration_tests::{TestContext, location};
use reqwest::StatusCode;

async fn signed_in() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;
    ctx
}

fn shows_product(page: &str, id: &str) -> bool {
    page.contains(&format!("/productDetails/{id}/"))
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.text().await.unwrap();
    assert!(body.contains("Fresh Cart"));
}

#[tokio::test]
async fn test_static_stylesheet_is_served() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/static/css/main.css").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_shows_categories_and_first_page() {
    let ctx = signed_in().await;

    let page = ctx.page("/").await;
    assert!(page.contains("Electronics"));
    assert!(shows_product(&page, "p1"));
    assert!(shows_product(&page, "p3"));
    assert!(!shows_product(&page, "p4"));
}

#[tokio::test]
async fn test_products_pagination() {
    let ctx = signed_in().await;

    let first = ctx.page("/products").await;
    assert!(shows_product(&first, "p1"));
    assert!(!shows_product(&first, "p4"));
    assert!(first.contains("/products?page=2"));

    let second = ctx.page("/products?page=2").await;
    assert!(shows_product(&second, "p4"));
    assert!(shows_product(&second, "p5"));
    assert!(!shows_product(&second, "p1"));
}

#[tokio::test]
async fn test_product_detail_shows_related_products_of_same_category() {
    let ctx = signed_in().await;

    let page = ctx.page("/productDetails/p1/Electronics").await;
    assert!(page.contains("<h1>Samsung Galaxy A54 5G Phone</h1>"));
    assert!(page.contains("Samsung Galaxy A54 5G Phone description"));
    assert!(shows_product(&page, "p2"));
    assert!(!shows_product(&page, "p3"));
    assert!(!shows_product(&page, "p5"));
}

#[tokio::test]
async fn test_product_detail_for_unknown_product_is_not_found() {
    let ctx = signed_in().await;

    let response = ctx.get("/productDetails/missing/Electronics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_detail_failure_returns_to_grid_with_notice() {
    let ctx = signed_in().await;
    ctx.api.fail("GET /api/v1/products/p1");

    let response = ctx.get("/productDetails/p1/Electronics").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products");

    let page = ctx.page("/products").await;
    assert!(page.contains("Failed to load product details."));
    assert!(shows_product(&page, "p1"));
}

#[tokio::test]
async fn test_category_filter_shows_only_matching_products() {
    let ctx = signed_in().await;

    let page = ctx.page("/categoryProducts/Men%27s%20Fashion").await;
    assert!(shows_product(&page, "p3"));
    assert!(shows_product(&page, "p5"));
    for other in ["p1", "p2", "p4"] {
        assert!(!shows_product(&page, other), "{other} listed");
    }
}

#[tokio::test]
async fn test_category_without_products_shows_empty_grid() {
    let ctx = signed_in().await;

    let page = ctx.page("/categoryProducts/Music").await;
    assert!(page.contains("No products found."));
}

#[tokio::test]
async fn test_categories_page_links_each_category() {
    let ctx = signed_in().await;

    let page = ctx.page("/categories").await;
    assert!(page.contains("/categoryProducts/Electronics"));
    assert!(page.contains("/categoryProducts/Women%27s%20Fashion"));
}

#[tokio::test]
async fn test_brand_filter_shows_only_matching_products() {
    let ctx = signed_in().await;

    let brands = ctx.page("/brands").await;
    assert!(brands.contains("/brandsProducts/DeFacto"));

    let page = ctx.page("/brandsProducts/DeFacto").await;
    assert!(shows_product(&page, "p3"));
    assert!(shows_product(&page, "p4"));
    for other in ["p1", "p2", "p5"] {
        assert!(!shows_product(&page, other), "{other} listed");
    }
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/login").await;
    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_gated_page_redirect_keeps_login_reachable() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/brands").await;
    assert_eq!(location(&response), "/login");
    ctx.page(location(&response)).await;
}
