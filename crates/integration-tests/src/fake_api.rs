//! In-process stand-in for the remote e-commerce API.
//!
//! Implements the endpoints the storefront calls, with the same JSON shapes,
//! status codes and error bodies, over an in-memory catalog and per-user
//! carts, wishlists and orders. Every request is recorded so tests can
//! assert which calls the storefront made.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use jsonwebtoken::{EncodingKey, Header};
use serde::Deserialize;
use serde_json::{Value, json};

/// Code accepted by the reset-code endpoint.
pub const RESET_CODE: &str = "246810";

/// Hosted payment page every checkout session points at.
pub const PAYMENT_URL: &str = "https://checkout.stripe.com/c/pay/cs_test_fresh_cart";

/// Products per catalog page.
pub const PAGE_SIZE: usize = 3;

/// A registered account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Default)]
struct Store {
    products: Vec<Value>,
    categories: Vec<Value>,
    brands: Vec<Value>,
    accounts: Vec<Account>,
    /// token -> account id
    tokens: HashMap<String, String>,
    /// account id -> (product id, count)
    carts: HashMap<String, Vec<(String, u32)>>,
    /// account id -> product ids
    wishlists: HashMap<String, Vec<String>>,
    /// account id -> orders
    orders: HashMap<String, Vec<Value>>,
    pending_reset: Option<String>,
    checkout_return_urls: Vec<String>,
    requests: Vec<String>,
    /// `"METHOD /path"` answered with a 500
    failing: Vec<String>,
    next_account: u32,
}

/// Handle to a running (or runnable) fake API.
#[derive(Clone, Default)]
pub struct FakeApi {
    store: Arc<Mutex<Store>>,
}

impl FakeApi {
    /// A fake API with a small seeded catalog and no accounts.
    #[must_use]
    pub fn new() -> Self {
        let api = Self::default();
        {
            let mut store = api.lock();
            store.categories = vec![
                category("c1", "Electronics"),
                category("c2", "Men's Fashion"),
                category("c3", "Women's Fashion"),
            ];
            store.brands = vec![
                brand("b1", "Samsung"),
                brand("b2", "DeFacto"),
                brand("b3", "Sony"),
            ];
            store.products = vec![
                product("p1", "Samsung Galaxy A54 5G Phone", 12999, Some(11999), ("c1", "Electronics"), Some(("b1", "Samsung"))),
                product("p2", "Sony WH-1000XM5 Wireless Headphones", 8499, None, ("c1", "Electronics"), Some(("b3", "Sony"))),
                product("p3", "Men Slim Fit Cotton Shirt", 499, None, ("c2", "Men's Fashion"), Some(("b2", "DeFacto"))),
                product("p4", "Woman Shawl Soft Wool", 149, None, ("c3", "Women's Fashion"), Some(("b2", "DeFacto"))),
                product("p5", "Men Leather Biker Jacket", 1899, Some(1499), ("c2", "Men's Fashion"), None),
            ];
        }
        api
    }

    /// Start serving on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API");
        let addr = listener.local_addr().expect("fake API address");
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        addr
    }

    /// Register an account directly.
    pub fn add_account(&self, name: &str, email: &str, password: &str) -> Account {
        let mut store = self.lock();
        store.next_account += 1;
        let account = Account {
            id: format!("u{}", store.next_account),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        store.accounts.push(account.clone());
        account
    }

    /// Record a placed order for an account.
    pub fn add_order(&self, account_id: &str, order: Value) {
        self.lock()
            .orders
            .entry(account_id.to_string())
            .or_default()
            .push(order);
    }

    /// The catalog record of a product.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<Value> {
        find_product(&self.lock(), id).cloned()
    }

    /// Invalidate every issued token, as if they had been revoked.
    pub fn revoke_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Answer one method and path with a 500 from now on.
    pub fn fail(&self, method_and_path: &str) {
        self.lock().failing.push(method_and_path.to_string());
    }

    /// Every request received so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Requests received for one method and path.
    #[must_use]
    pub fn count_requests(&self, method_and_path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| *r == method_and_path)
            .count()
    }

    /// Cart lines of an account as (product id, count).
    #[must_use]
    pub fn cart(&self, account_id: &str) -> Vec<(String, u32)> {
        self.lock().carts.get(account_id).cloned().unwrap_or_default()
    }

    /// Product ids on an account's wishlist.
    #[must_use]
    pub fn wishlist(&self, account_id: &str) -> Vec<String> {
        self.lock()
            .wishlists
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Return URLs passed to checkout-session requests.
    #[must_use]
    pub fn checkout_return_urls(&self) -> Vec<String> {
        self.lock().checkout_return_urls.clone()
    }

    /// The API's routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/v1/auth/signin", post(sign_in))
            .route("/api/v1/auth/signup", post(sign_up))
            .route("/api/v1/auth/forgotPasswords", post(forgot_password))
            .route("/api/v1/auth/verifyResetCode", post(verify_reset_code))
            .route("/api/v1/auth/resetPassword", put(reset_password))
            .route("/api/v1/products", get(products))
            .route("/api/v1/products/{id}", get(product_by_id))
            .route("/api/v1/categories", get(categories))
            .route("/api/v1/categories/{id}", get(category_by_id))
            .route("/api/v1/brands", get(brands))
            .route("/api/v1/brands/{id}", get(brand_by_id))
            .route(
                "/api/v1/cart",
                get(get_cart).post(add_to_cart).delete(clear_cart),
            )
            .route(
                "/api/v1/cart/{id}",
                put(update_cart_item).delete(remove_cart_item),
            )
            .route("/api/v1/wishlist", get(get_wishlist).post(add_to_wishlist))
            .route("/api/v1/wishlist/{id}", delete(remove_from_wishlist))
            .route("/api/v1/orders/user/{id}", get(user_orders))
            .route("/api/v1/orders/checkout-session/{id}", post(checkout_session))
            .layer(axum::middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Seed Data
// =============================================================================

fn category(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "image": format!("https://img.example/categories/{id}.png"),
    })
}

fn brand(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "slug": name.to_lowercase(),
        "image": format!("https://img.example/brands/{id}.png"),
    })
}

fn product(
    id: &str,
    title: &str,
    price: u32,
    discounted: Option<u32>,
    (category_id, category_name): (&str, &str),
    brand_ref: Option<(&str, &str)>,
) -> Value {
    let mut value = json!({
        "_id": id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "description": format!("{title} description"),
        "quantity": 20,
        "sold": 5,
        "price": price,
        "imageCover": format!("https://img.example/products/{id}-cover.jpeg"),
        "images": [format!("https://img.example/products/{id}-1.jpeg")],
        "ratingsAverage": 4.5,
        "ratingsQuantity": 12,
        "category": category(category_id, category_name),
        "subcategory": [],
    });
    if let Some(discounted) = discounted {
        value["priceAfterDiscount"] = json!(discounted);
    }
    if let Some((brand_id, brand_name)) = brand_ref {
        value["brand"] = brand(brand_id, brand_name);
    }
    value
}

// =============================================================================
// Helpers
// =============================================================================

async fn record(State(api): State<FakeApi>, request: Request, next: Next) -> Response {
    let call = format!("{} {}", request.method(), request.uri().path());
    let failing = {
        let mut store = api.lock();
        let failing = store.failing.contains(&call);
        store.requests.push(call);
        failing
    };
    if failing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal Server Error" })),
        )
            .into_response();
    }
    next.run(request).await
}

fn fail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "statusMsg": "fail", "message": message })),
    )
        .into_response()
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

fn mint_token(store: &mut Store, account: &Account) -> String {
    let issued = now();
    let token = jsonwebtoken::encode(
        &Header::default(),
        &json!({
            "id": account.id,
            "name": account.name,
            "role": "user",
            "iat": issued,
            "exp": issued + 90 * 24 * 60 * 60,
        }),
        &EncodingKey::from_secret(b"fake-api-secret"),
    )
    .unwrap_or_default();
    store.tokens.insert(token.clone(), account.id.clone());
    token
}

fn auth_reply(store: &mut Store, account: &Account, status: StatusCode) -> Response {
    let token = mint_token(store, account);
    (
        status,
        Json(json!({
            "message": "success",
            "user": { "name": account.name, "email": account.email, "role": "user" },
            "token": token,
        })),
    )
        .into_response()
}

/// Resolve the `token` header to an account id.
fn caller(store: &Store, headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get("token")
        .and_then(|v| v.to_str().ok())
        .and_then(|token| store.tokens.get(token).cloned())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid Token. please login again"))
}

fn find_product<'a>(store: &'a Store, id: &str) -> Option<&'a Value> {
    store.products.iter().find(|p| p["_id"] == id)
}

fn page_of(items: &[Value], page: usize, limit: usize) -> Value {
    let number_of_pages = items.len().div_ceil(limit).max(1);
    let data: Vec<Value> = items
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();
    let mut metadata = json!({
        "currentPage": page,
        "numberOfPages": number_of_pages,
        "limit": limit,
    });
    if page < number_of_pages {
        metadata["nextPage"] = json!(page + 1);
    }
    json!({ "results": data.len(), "metadata": metadata, "data": data })
}

fn cart_reply(store: &Store, account_id: &str, populated: bool, message: Option<&str>) -> Value {
    let lines = store.carts.get(account_id).cloned().unwrap_or_default();
    let mut total = 0_u64;
    let products: Vec<Value> = lines
        .iter()
        .map(|(product_id, count)| {
            let product = find_product(store, product_id).cloned().unwrap_or(Value::Null);
            let price = product["price"].as_u64().unwrap_or_default();
            total += price * u64::from(*count);
            json!({
                "_id": format!("line-{product_id}"),
                "count": count,
                "price": price,
                "product": if populated { product } else { json!(product_id) },
            })
        })
        .collect();

    let cart_id = format!("cart-{account_id}");
    let mut reply = json!({
        "status": "success",
        "numOfCartItems": products.len(),
        "cartId": cart_id,
        "data": {
            "_id": cart_id,
            "cartOwner": account_id,
            "products": products,
            "totalCartPrice": total,
        },
    });
    if let Some(message) = message {
        reply["message"] = json!(message);
    }
    reply
}

// =============================================================================
// Auth Handlers
// =============================================================================

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn sign_in(State(api): State<FakeApi>, Json(body): Json<Credentials>) -> Response {
    let mut store = api.lock();
    let account = store
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
        .cloned();
    match account {
        Some(account) => auth_reply(&mut store, &account, StatusCode::OK),
        None => fail(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    }
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
    password: String,
}

async fn sign_up(State(api): State<FakeApi>, Json(body): Json<Registration>) -> Response {
    if api.lock().accounts.iter().any(|a| a.email == body.email) {
        return fail(StatusCode::CONFLICT, "Account Already Exists");
    }
    let account = api.add_account(&body.name, &body.email, &body.password);
    let mut store = api.lock();
    auth_reply(&mut store, &account, StatusCode::CREATED)
}

#[derive(Deserialize)]
struct EmailBody {
    email: String,
}

async fn forgot_password(State(api): State<FakeApi>, Json(body): Json<EmailBody>) -> Response {
    let mut store = api.lock();
    if !store.accounts.iter().any(|a| a.email == body.email) {
        return fail(
            StatusCode::NOT_FOUND,
            &format!("There is no user registered with this email address {}", body.email),
        );
    }
    store.pending_reset = Some(body.email);
    Json(json!({ "statusMsg": "success", "message": "Reset code sent to your email" }))
        .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetCodeBody {
    reset_code: String,
}

async fn verify_reset_code(
    State(api): State<FakeApi>,
    Json(body): Json<ResetCodeBody>,
) -> Response {
    let store = api.lock();
    if store.pending_reset.is_none() || body.reset_code != RESET_CODE {
        return fail(StatusCode::BAD_REQUEST, "Reset code is invalid or has expired");
    }
    Json(json!({ "status": "Success" })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewPasswordBody {
    email: String,
    new_password: String,
}

async fn reset_password(
    State(api): State<FakeApi>,
    Json(body): Json<NewPasswordBody>,
) -> Response {
    let mut store = api.lock();
    if store.pending_reset.as_deref() != Some(body.email.as_str()) {
        return fail(StatusCode::BAD_REQUEST, "reset code not verified");
    }
    store.pending_reset = None;
    let Some(account) = store.accounts.iter_mut().find(|a| a.email == body.email) else {
        return fail(StatusCode::NOT_FOUND, "There is no user with this email address");
    };
    account.password = body.new_password;
    let account = account.clone();
    let token = mint_token(&mut store, &account);
    Json(json!({ "token": token })).into_response()
}

// =============================================================================
// Catalog Handlers
// =============================================================================

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

async fn products(State(api): State<FakeApi>, Query(query): Query<PageQuery>) -> Json<Value> {
    let store = api.lock();
    Json(page_of(
        &store.products,
        query.page.unwrap_or(1).max(1),
        query.limit.unwrap_or(PAGE_SIZE).max(1),
    ))
}

async fn product_by_id(State(api): State<FakeApi>, Path(id): Path<String>) -> Response {
    let store = api.lock();
    match find_product(&store, &id) {
        Some(product) => Json(json!({ "data": product })).into_response(),
        None => fail(StatusCode::NOT_FOUND, &format!("No product for this id {id}")),
    }
}

async fn categories(State(api): State<FakeApi>) -> Json<Value> {
    let store = api.lock();
    Json(page_of(&store.categories, 1, 40))
}

async fn category_by_id(State(api): State<FakeApi>, Path(id): Path<String>) -> Response {
    let store = api.lock();
    match store.categories.iter().find(|c| c["_id"] == id.as_str()) {
        Some(category) => Json(json!({ "data": category })).into_response(),
        None => fail(StatusCode::NOT_FOUND, &format!("No category for this id {id}")),
    }
}

async fn brand_by_id(State(api): State<FakeApi>, Path(id): Path<String>) -> Response {
    let store = api.lock();
    match store.brands.iter().find(|b| b["_id"] == id.as_str()) {
        Some(brand) => Json(json!({ "data": brand })).into_response(),
        None => fail(StatusCode::NOT_FOUND, &format!("No brand for this id {id}")),
    }
}

async fn brands(State(api): State<FakeApi>, Query(query): Query<PageQuery>) -> Json<Value> {
    let store = api.lock();
    Json(page_of(&store.brands, 1, query.limit.unwrap_or(40).max(1)))
}

// =============================================================================
// Cart Handlers
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    product_id: String,
}

#[derive(Deserialize)]
struct CountBody {
    count: u32,
}

async fn get_cart(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    if !store.carts.contains_key(&account) {
        return fail(
            StatusCode::NOT_FOUND,
            &format!("No cart exist for this user: {account}"),
        );
    }
    Json(cart_reply(&store, &account, true, None)).into_response()
}

async fn add_to_cart(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    if find_product(&store, &body.product_id).is_none() {
        return fail(
            StatusCode::NOT_FOUND,
            &format!("No product for this id {}", body.product_id),
        );
    }
    let lines = store.carts.entry(account.clone()).or_default();
    match lines.iter_mut().find(|(id, _)| *id == body.product_id) {
        Some((_, count)) => *count += 1,
        None => lines.push((body.product_id, 1)),
    }
    Json(cart_reply(
        &store,
        &account,
        false,
        Some("Product added successfully to your cart"),
    ))
    .into_response()
}

async fn update_cart_item(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CountBody>,
) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    let line = store
        .carts
        .get_mut(&account)
        .and_then(|lines| lines.iter_mut().find(|(pid, _)| *pid == id));
    match line {
        Some((_, count)) => *count = body.count,
        None => return fail(StatusCode::NOT_FOUND, "Product not found in cart"),
    }
    Json(cart_reply(&store, &account, true, None)).into_response()
}

async fn remove_cart_item(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    if let Some(lines) = store.carts.get_mut(&account) {
        lines.retain(|(pid, _)| *pid != id);
    }
    Json(cart_reply(&store, &account, true, None)).into_response()
}

async fn clear_cart(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    store.carts.remove(&account);
    Json(json!({ "message": "success" })).into_response()
}

// =============================================================================
// Wishlist Handlers
// =============================================================================

async fn get_wishlist(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    let data: Vec<Value> = store
        .wishlists
        .get(&account)
        .into_iter()
        .flatten()
        .filter_map(|id| find_product(&store, id).cloned())
        .collect();
    Json(json!({ "status": "success", "count": data.len(), "data": data })).into_response()
}

async fn add_to_wishlist(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    let ids = store.wishlists.entry(account).or_default();
    if !ids.contains(&body.product_id) {
        ids.push(body.product_id);
    }
    Json(json!({
        "status": "success",
        "message": "Product added successfully to your wishlist",
        "data": ids.clone(),
    }))
    .into_response()
}

async fn remove_from_wishlist(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    let ids = store.wishlists.entry(account).or_default();
    ids.retain(|pid| *pid != id);
    Json(json!({
        "status": "success",
        "message": "Product removed successfully to your wishlist",
        "data": ids.clone(),
    }))
    .into_response()
}

// =============================================================================
// Order Handlers
// =============================================================================

async fn user_orders(State(api): State<FakeApi>, Path(id): Path<String>) -> Json<Value> {
    let store = api.lock();
    Json(json!(store.orders.get(&id).cloned().unwrap_or_default()))
}

#[derive(Deserialize)]
struct ReturnQuery {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    shipping_address: Value,
}

async fn checkout_session(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(cart_id): Path<String>,
    Query(query): Query<ReturnQuery>,
    Json(body): Json<CheckoutBody>,
) -> Response {
    let mut store = api.lock();
    let account = match caller(&store, &headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };
    let owns_cart = cart_id == format!("cart-{account}")
        && store.carts.get(&account).is_some_and(|lines| !lines.is_empty());
    if !owns_cart || body.shipping_address["city"].as_str().is_none() {
        return fail(StatusCode::NOT_FOUND, &format!("No cart for this id {cart_id}"));
    }
    store.checkout_return_urls.push(query.url);
    Json(json!({
        "status": "success",
        "session": { "url": PAYMENT_URL },
    }))
    .into_response()
}
