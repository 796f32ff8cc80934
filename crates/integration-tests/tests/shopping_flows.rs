//! Integration tests for the cart, wishlist, checkout and order history.

#![allow(clippy::unwrap_used)]

use fresh_cart_integration_tests::fake_api::PAYMENT_URL;
use fresh_cart_integration_tests::{TestContext, location};
use reqwest::StatusCode;
use serde_json::json;

async fn signed_in() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;
    ctx
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_add_to_cart_returns_to_the_page_and_updates_the_badge() {
    let ctx = signed_in().await;

    let response = ctx
        .post_form(
            "/cart/add",
            &[("productId", "p3"), ("redirect_to", "/products?page=1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products?page=1");

    let page = ctx.page("/products?page=1").await;
    assert!(page.contains("Product added successfully to your cart"));
    assert!(page.contains(r#"<span class="badge">1</span>"#));
    assert_eq!(ctx.api.cart(&ctx.shopper.id), vec![("p3".to_string(), 1)]);
}

#[tokio::test]
async fn test_add_to_cart_ignores_foreign_redirect_targets() {
    let ctx = signed_in().await;

    let response = ctx
        .post_form(
            "/cart/add",
            &[("productId", "p3"), ("redirect_to", "https://evil.example/")],
        )
        .await;
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_add_to_cart_ignores_redirect_targets_with_tabs() {
    let ctx = signed_in().await;

    let response = ctx
        .post_form(
            "/cart/add",
            &[("productId", "p3"), ("redirect_to", "/\t/evil.example/")],
        )
        .await;
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_empty_cart_page() {
    let ctx = signed_in().await;

    let page = ctx.page("/cart").await;
    assert!(page.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_cart_page_lists_lines_and_total() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p4")]).await;
    ctx.post_form("/cart/add", &[("productId", "p4")]).await;
    ctx.post_form("/cart/add", &[("productId", "p3")]).await;

    let page = ctx.page("/cart").await;
    assert!(page.contains("Woman Shawl Soft Wool"));
    assert!(page.contains("Men Slim Fit Cotton Shirt"));
    // 2 x 149 + 499
    assert!(page.contains("797 EGP"));
}

#[tokio::test]
async fn test_update_quantity_sets_the_count() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p4")]).await;

    let response = ctx
        .post_form(
            "/cart/update",
            &[
                ("productId", "p4"),
                ("count", "3"),
                ("title", "Woman Shawl Soft Wool"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/cart");
    assert_eq!(ctx.api.cart(&ctx.shopper.id), vec![("p4".to_string(), 3)]);

    let page = ctx.page("/cart").await;
    assert!(page.contains("Woman Shawl updated successfully"));
}

#[tokio::test]
async fn test_update_quantity_names_the_product_from_the_cart_reply() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p4")]).await;

    ctx.post_form("/cart/update", &[("productId", "p4"), ("count", "2")])
        .await;

    let page = ctx.page("/cart").await;
    assert!(page.contains("Woman Shawl updated successfully"));
    assert!(!page.contains("Item updated successfully"));
}

#[tokio::test]
async fn test_update_quantity_to_zero_removes_the_line() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p4")]).await;

    ctx.post_form(
        "/cart/update",
        &[
            ("productId", "p4"),
            ("count", "0"),
            ("title", "Woman Shawl Soft Wool"),
        ],
    )
    .await;

    assert!(ctx.api.cart(&ctx.shopper.id).is_empty());
    assert_eq!(ctx.api.count_requests("PUT /api/v1/cart/p4"), 0);
    assert_eq!(ctx.api.count_requests("DELETE /api/v1/cart/p4"), 1);

    let page = ctx.page("/cart").await;
    assert!(page.contains("Woman Shawl removed from cart"));
    assert!(page.contains(r#"<span class="badge">0</span>"#));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p1")]).await;
    ctx.post_form("/cart/add", &[("productId", "p2")]).await;

    ctx.post_form(
        "/cart/remove",
        &[("productId", "p1"), ("title", "Samsung Galaxy A54 5G Phone")],
    )
    .await;
    assert_eq!(ctx.api.cart(&ctx.shopper.id), vec![("p2".to_string(), 1)]);

    let response = ctx.post_form("/cart/clear", &[]).await;
    assert_eq!(location(&response), "/cart");
    assert!(ctx.api.cart(&ctx.shopper.id).is_empty());

    let page = ctx.page("/cart").await;
    assert!(page.contains("Cart cleared"));
    assert!(page.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_unknown_product_shows_server_message() {
    let ctx = signed_in().await;

    ctx.post_form("/cart/add", &[("productId", "nope")]).await;

    let page = ctx.page("/cart").await;
    assert!(page.contains("Failed to add product to cart."));
}

// =============================================================================
// Wishlist
// =============================================================================

#[tokio::test]
async fn test_wishlist_toggle_twice_restores_membership() {
    let ctx = signed_in().await;
    let form = [("productId", "p2"), ("redirect_to", "/products")];

    let response = ctx.post_form("/wishlist/toggle", &form).await;
    assert_eq!(location(&response), "/products");
    assert_eq!(ctx.api.wishlist(&ctx.shopper.id), vec!["p2".to_string()]);
    assert!(
        ctx.page("/products")
            .await
            .contains("Product added successfully to your wishlist")
    );

    ctx.post_form("/wishlist/toggle", &form).await;
    assert!(ctx.api.wishlist(&ctx.shopper.id).is_empty());
}

#[tokio::test]
async fn test_wishlist_toggle_failure_names_the_attempted_change() {
    let ctx = signed_in().await;
    ctx.post_form("/wishlist/toggle", &[("productId", "p2")])
        .await;
    ctx.api.fail("DELETE /api/v1/wishlist/p2");

    ctx.post_form("/wishlist/toggle", &[("productId", "p2")])
        .await;
    let page = ctx.page("/products").await;
    assert!(page.contains("Failed to delete product from wishlist."));
    assert!(!page.contains("Failed to add product to wishlist."));
    assert_eq!(ctx.api.wishlist(&ctx.shopper.id), vec!["p2".to_string()]);

    ctx.api.fail("POST /api/v1/wishlist");
    ctx.post_form("/wishlist/toggle", &[("productId", "p3")])
        .await;
    let page = ctx.page("/products").await;
    assert!(page.contains("Failed to add product to wishlist."));
    assert!(!page.contains("Failed to delete product from wishlist."));
}

#[tokio::test]
async fn test_wishlist_page_lists_members() {
    let ctx = signed_in().await;
    ctx.post_form("/wishlist/toggle", &[("productId", "p5")])
        .await;

    let page = ctx.page("/wishlist").await;
    assert!(page.contains("Men Leather Biker Jacket"));
    assert!(!page.contains("Woman Shawl Soft Wool"));

    let response = ctx
        .post_form("/wishlist/remove", &[("productId", "p5")])
        .await;
    assert_eq!(location(&response), "/wishlist");
    assert!(ctx.api.wishlist(&ctx.shopper.id).is_empty());
}

#[tokio::test]
async fn test_product_grid_marks_wishlist_members() {
    let ctx = signed_in().await;
    ctx.post_form("/wishlist/toggle", &[("productId", "p1")])
        .await;

    let page = ctx.page("/products?page=1").await;
    assert_eq!(page.matches("heart--on").count(), 1);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_redirects_to_payment_page() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p3")]).await;

    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("details", "12 Tahrir St"),
                ("phone", "01012345678"),
                ("city", "Cairo"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), PAYMENT_URL);
    assert_eq!(
        ctx.api.checkout_return_urls(),
        vec![ctx.url("/allorders")]
    );
}

#[tokio::test]
async fn test_checkout_with_missing_city_rerenders_form() {
    let ctx = signed_in().await;
    ctx.post_form("/cart/add", &[("productId", "p3")]).await;

    let response = ctx
        .post_form(
            "/checkout",
            &[("details", "12 Tahrir St"), ("phone", "01012345678"), ("city", "")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("City Name is required"));
    assert!(body.contains("12 Tahrir St"));
    assert!(ctx.api.checkout_return_urls().is_empty());
}

#[tokio::test]
async fn test_checkout_with_empty_cart_returns_to_cart() {
    let ctx = signed_in().await;

    let response = ctx
        .post_form(
            "/checkout",
            &[("phone", "01012345678"), ("city", "Cairo")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
    assert!(ctx.page("/cart").await.contains("Your cart is empty."));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_orders_page_lists_newest_first_and_expands() {
    let ctx = signed_in().await;
    let shirt = ctx.api.product("p3").unwrap();
    let shawl = ctx.api.product("p4").unwrap();

    ctx.api.add_order(
        &ctx.shopper.id,
        json!({
            "_id": "o-older",
            "id": 41,
            "totalOrderPrice": 149,
            "paymentMethodType": "cash",
            "isPaid": false,
            "isDelivered": true,
            "createdAt": "2026-03-01T09:00:00.000Z",
            "cartItems": [{ "_id": "l1", "count": 1, "price": 149, "product": shawl }],
        }),
    );
    ctx.api.add_order(
        &ctx.shopper.id,
        json!({
            "_id": "o-newer",
            "id": 42,
            "totalOrderPrice": 998,
            "paymentMethodType": "card",
            "isPaid": true,
            "isDelivered": false,
            "createdAt": "2026-04-01T09:00:00.000Z",
            "cartItems": [{ "_id": "l2", "count": 2, "price": 499, "product": shirt }],
        }),
    );

    let page = ctx.page("/allorders").await;
    let newer = page.find("Order #42").unwrap();
    let older = page.find("Order #41").unwrap();
    assert!(newer < older);
    assert!(page.contains("On The Way"));
    assert!(page.contains("Delivered"));
    assert!(!page.contains("Men Slim Fit Cotton Shirt"));

    let expanded = ctx.page("/allorders?expanded=o-newer").await;
    assert!(expanded.contains("Men Slim Fit Cotton Shirt"));
    assert!(!expanded.contains("Woman Shawl Soft Wool"));
}

#[tokio::test]
async fn test_orders_page_without_orders() {
    let ctx = signed_in().await;

    let page = ctx.page("/allorders").await;
    assert!(page.contains("You have not placed any orders yet."));
}
