//! Domain types for the remote e-commerce REST API.
//!
//! The API speaks camelCase JSON with Mongo-style `_id` keys. These types
//! mirror its responses closely enough to deserialize them, and expose the
//! cleaner shapes the stores and views work with.

use chrono::{DateTime, Utc};
use fresh_cart_core::{
    BrandId, CartId, CartItemId, CategoryId, OrderId, OrderNumber, Price, ProductId,
    SubcategoryId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Envelopes
// =============================================================================

/// Pagination metadata attached to collection responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub current_page: u32,
    pub number_of_pages: u32,
    pub limit: u32,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub prev_page: Option<u32>,
}

/// A page of a collection endpoint (`/products`, `/categories`, `/brands`).
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub results: u32,
    #[serde(default)]
    pub metadata: PageMetadata,
    pub data: Vec<T>,
}

/// A single record wrapped in `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Single<T> {
    pub data: T,
}

/// Error body returned by the API on non-success statuses.
///
/// Business errors carry `message`; request validation errors carry
/// `message: "fail"` plus an `errors` object whose `msg` is the real text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrorBody>,
}

/// The `errors` member of a validation failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
}

impl ErrorBody {
    /// The most specific human-readable message in the body.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        let field_msg = self.errors.and_then(|e| e.msg);
        match self.message {
            Some(message) if message != "fail" => Some(message),
            _ => field_msg,
        }
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Product brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Product subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

/// A catalog product.
///
/// Cart and order lines embed a reduced projection of the same record
/// (no price, no description), so everything beyond id, title and category
/// falls back to a default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub sold: Option<u64>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub price_after_discount: Option<Decimal>,
    #[serde(default)]
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_quantity: u32,
    pub category: Category,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub subcategory: Vec<Subcategory>,
}

impl Product {
    /// The regular price.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::egp(self.price)
    }

    /// The discounted price, when the product is on sale.
    #[must_use]
    pub fn sale_price(&self) -> Option<Price> {
        self.price_after_discount
            .filter(|discounted| *discounted < self.price)
            .map(Price::egp)
    }

    /// Name of the product's brand, if it has one.
    #[must_use]
    pub fn brand_name(&self) -> Option<&str> {
        self.brand.as_ref().map(|b| b.name.as_str())
    }
}

// =============================================================================
// Auth Types
// =============================================================================

/// Sign-in request body.
#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Sign-up request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub re_password: &'a str,
    pub phone: &'a str,
}

/// Account summary returned alongside a fresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Successful sign-in or sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
    pub token: String,
}

/// Reply to a forgot-password request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequested {
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to a reset-code verification.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetCodeVerified {
    #[serde(default)]
    pub status: Option<String>,
}

/// Reply to a completed password reset.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordReset {
    pub token: String,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product reference inside a cart line.
///
/// Reads return populated products; the add-to-cart reply only carries ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartProduct {
    Populated(Box<Product>),
    Reference(ProductId),
}

impl CartProduct {
    /// The referenced product's id.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Populated(product) => &product.id,
            Self::Reference(id) => id,
        }
    }

    /// The populated product, when the response included it.
    #[must_use]
    pub fn populated(&self) -> Option<&Product> {
        match self {
            Self::Populated(product) => Some(product),
            Self::Reference(_) => None,
        }
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub count: u32,
    pub price: Decimal,
    pub product: CartProduct,
}

impl CartLine {
    /// Unit price.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::egp(self.price)
    }

    /// Unit price times count.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.unit_price().times(self.count)
    }
}

/// The cart document inside a cart response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartData {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(default)]
    pub cart_owner: Option<UserId>,
    #[serde(default)]
    pub products: Vec<CartLine>,
    #[serde(default)]
    pub total_cart_price: Decimal,
}

/// Response of every cart read and mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub num_of_cart_items: u32,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    pub data: CartData,
}

/// Server-owned cart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner: Option<UserId>,
    pub lines: Vec<CartLine>,
    pub total_price: Decimal,
    pub item_count: u32,
}

impl Cart {
    /// The aggregate total.
    #[must_use]
    pub fn total(&self) -> Price {
        Price::egp(self.total_price)
    }

    /// `true` when the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product`, if present.
    #[must_use]
    pub fn line_for(&self, product: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id() == product)
    }
}

impl From<CartResponse> for Cart {
    fn from(response: CartResponse) -> Self {
        Self {
            id: response.cart_id.unwrap_or(response.data.id),
            owner: response.data.cart_owner,
            item_count: response.num_of_cart_items,
            total_price: response.data.total_cart_price,
            lines: response.data.products,
        }
    }
}

/// Request body carrying a single product id (cart and wishlist adds).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest<'a> {
    pub product_id: &'a ProductId,
}

/// Request body of a quantity change.
#[derive(Debug, Serialize)]
pub struct CountRequest {
    pub count: u32,
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// Full wishlist read.
#[derive(Debug, Clone, Deserialize)]
pub struct WishlistResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub data: Vec<Product>,
}

/// Reply to a wishlist add or remove: the new set of product ids.
#[derive(Debug, Clone, Deserialize)]
pub struct WishlistChange {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<ProductId>,
}

// =============================================================================
// Order Types
// =============================================================================

/// Shipping address submitted at checkout and stored on orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub details: String,
    pub phone: String,
    pub city: String,
}

/// Customer summary embedded in an order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCustomer {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A line item of a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub count: u32,
    pub price: Decimal,
    pub product: Product,
}

/// How an order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
}

/// A placed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub object_id: OrderId,
    pub id: OrderNumber,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub tax_price: Decimal,
    #[serde(default)]
    pub shipping_price: Decimal,
    pub total_order_price: Decimal,
    pub payment_method_type: PaymentMethod,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    pub cart_items: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

/// Checkout request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub shipping_address: &'a ShippingAddress,
}

/// Hosted payment session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// Reply to a checkout-session request.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub session: CheckoutSession,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json(id: &str, category: &str) -> serde_json::Value {
        json!({
            "sold": 8913,
            "images": ["a.jpeg", "b.jpeg"],
            "subcategory": [{"_id": "6407f1bcb575d3b90bf95797", "name": "Women's Clothing", "slug": "women's-clothing", "category": "6439d58a0049ad0b52b9003f"}],
            "ratingsQuantity": 18,
            "_id": id,
            "title": "Woman Shawl Cotton",
            "slug": "woman-shawl",
            "description": "Material\tPolyester Blend",
            "quantity": 225,
            "price": 149,
            "imageCover": "cover.jpeg",
            "category": {"_id": "6439d58a0049ad0b52b9003f", "name": category, "slug": "women's-fashion", "image": "cat.jpeg"},
            "brand": {"_id": "64089bbe24b25627a253158b", "name": "DeFacto", "slug": "defacto", "image": "brand.png"},
            "ratingsAverage": 4.8,
            "createdAt": "2023-02-24T10:55:40.334Z",
            "updatedAt": "2024-10-19T11:08:56.143Z",
            "id": id
        })
    }

    #[test]
    fn test_product_ignores_duplicate_plain_id() {
        let product: Product =
            serde_json::from_value(product_json("6428ebc6dc1175abc65ca0b9", "Women's Fashion"))
                .unwrap();
        assert_eq!(product.id.as_str(), "6428ebc6dc1175abc65ca0b9");
        assert_eq!(product.category.name, "Women's Fashion");
        assert_eq!(product.brand_name(), Some("DeFacto"));
        assert_eq!(product.price().to_string(), "149 EGP");
        assert!(product.sale_price().is_none());
    }

    #[test]
    fn test_sale_price_only_when_lower() {
        let mut value = product_json("p1", "Electronics");
        value["priceAfterDiscount"] = json!(99);
        let product: Product = serde_json::from_value(value).unwrap();
        assert_eq!(product.sale_price().map(|p| p.to_string()), Some("99 EGP".into()));
    }

    #[test]
    fn test_cart_add_reply_with_id_references() {
        let body = json!({
            "status": "success",
            "message": "Product added successfully to your cart",
            "numOfCartItems": 2,
            "cartId": "66f2e1a0b1b7d0a3c8e4f001",
            "data": {
                "_id": "66f2e1a0b1b7d0a3c8e4f001",
                "cartOwner": "66f2d0e5b1b7d0a3c8e4e9aa",
                "products": [
                    {"count": 1, "_id": "line-1", "product": "6428ebc6dc1175abc65ca0b9", "price": 149},
                    {"count": 3, "_id": "line-2", "product": "6428ead5dc1175abc65ca0ad", "price": 1299}
                ],
                "totalCartPrice": 4046
            }
        });
        let cart = Cart::from(serde_json::from_value::<CartResponse>(body).unwrap());
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.lines.len(), 2);
        assert!(cart.lines.iter().all(|l| l.product.populated().is_none()));
        let line = cart.line_for(&ProductId::new("6428ead5dc1175abc65ca0ad")).unwrap();
        assert_eq!(line.line_price().to_string(), "3897 EGP");
        assert_eq!(cart.total().to_string(), "4046 EGP");
    }

    #[test]
    fn test_cart_read_with_populated_products() {
        let body = json!({
            "status": "success",
            "numOfCartItems": 1,
            "cartId": "c1",
            "data": {
                "_id": "c1",
                "cartOwner": "u1",
                "products": [{"count": 2, "_id": "line-1", "product": product_json("p1", "Men's Fashion"), "price": 149}],
                "totalCartPrice": 298
            }
        });
        let cart = Cart::from(serde_json::from_value::<CartResponse>(body).unwrap());
        let product = cart.lines[0].product.populated().unwrap();
        assert_eq!(product.title, "Woman Shawl Cotton");
    }

    #[test]
    fn test_error_body_prefers_business_message() {
        let body: ErrorBody = serde_json::from_value(json!({
            "statusMsg": "fail",
            "message": "Incorrect email or password"
        }))
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Incorrect email or password"));
    }

    #[test]
    fn test_error_body_falls_back_to_field_error() {
        let body: ErrorBody = serde_json::from_value(json!({
            "message": "fail",
            "errors": {"value": "x", "msg": "Invalid Email", "param": "email", "location": "body"}
        }))
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid Email"));
    }

    #[test]
    fn test_order_deserializes_numeric_display_id() {
        let order: Order = serde_json::from_value(json!({
            "shippingAddress": {"details": "12 Nile St", "phone": "01012345678", "city": "Cairo"},
            "taxPrice": 0,
            "shippingPrice": 0,
            "totalOrderPrice": 298,
            "paymentMethodType": "card",
            "isPaid": true,
            "isDelivered": false,
            "_id": "66f3aa",
            "user": {"_id": "u1", "name": "Mona", "email": "mona@example.com", "phone": "01012345678"},
            "cartItems": [{"count": 2, "_id": "line-1", "product": product_json("p1", "Men's Fashion"), "price": 149}],
            "paidAt": "2024-09-24T10:00:00.000Z",
            "createdAt": "2024-09-24T09:58:12.000Z",
            "updatedAt": "2024-09-24T10:00:00.000Z",
            "id": 71245,
            "__v": 0
        }))
        .unwrap();
        assert_eq!(order.id.to_string(), "#71245");
        assert_eq!(order.payment_method_type, PaymentMethod::Card);
        assert_eq!(order.cart_items.len(), 1);
    }
}
