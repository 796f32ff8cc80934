//! Order history route handler.
//!
//! One order at a time can be expanded to show its line items; the expanded
//! order is carried in the `expanded` query parameter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use fresh_cart_core::Price;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, detail_path, report_failure};
use crate::api::{Order, OrderLine, PaymentMethod};
use crate::filters;
use crate::middleware::RequireSession;
use crate::state::AppState;

/// Order line display data.
#[derive(Clone)]
pub struct OrderLineView {
    pub title: String,
    pub image: String,
    pub detail_path: String,
    pub count: u32,
    pub price: String,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            title: line.product.title.clone(),
            image: line.product.image_cover.clone(),
            detail_path: detail_path(line.product.id.as_str(), &line.product.category.name),
            count: line.count,
            price: Price::egp(line.price).to_string(),
        }
    }
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub number: String,
    pub placed_on: String,
    pub payment: &'static str,
    pub paid: bool,
    pub delivery_status: &'static str,
    pub total: String,
    pub item_count: usize,
    pub expanded: bool,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    fn new(order: &Order, expanded: Option<&str>) -> Self {
        let id = order.object_id.to_string();
        let expanded = expanded == Some(id.as_str());
        Self {
            number: order.id.to_string(),
            placed_on: order.created_at.format("%d %b %Y").to_string(),
            payment: match order.payment_method_type {
                PaymentMethod::Card => "Card",
                PaymentMethod::Cash => "Cash",
            },
            paid: order.is_paid,
            delivery_status: delivery_status(order),
            total: Price::egp(order.total_order_price).to_string(),
            item_count: order.cart_items.len(),
            expanded,
            lines: if expanded {
                order.cart_items.iter().map(OrderLineView::from).collect()
            } else {
                Vec::new()
            },
            id,
        }
    }

    /// Link that expands this order, or collapses it when already open.
    #[must_use]
    pub fn toggle_path(&self) -> String {
        if self.expanded {
            "/allorders".to_string()
        } else {
            format!("/allorders?expanded={}", urlencoding::encode(&self.id))
        }
    }
}

const fn delivery_status(order: &Order) -> &'static str {
    if order.is_delivered {
        "Delivered"
    } else {
        "On The Way"
    }
}

/// Order history query parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub expanded: Option<String>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    /// `None` when the history could not be loaded.
    pub orders: Option<Vec<OrderView>>,
}

/// Display the signed-in user's past orders, newest first.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireSession(user): RequireSession,
    Query(query): Query<OrdersQuery>,
) -> impl IntoResponse {
    let orders = match state.api().user_orders(&user.id).await {
        Ok(mut orders) => {
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Some(
                orders
                    .iter()
                    .map(|o| OrderView::new(o, query.expanded.as_deref()))
                    .collect::<Vec<_>>(),
            )
        }
        Err(e) => {
            report_failure(&session, &e.into(), "Failed to load your orders.").await;
            None
        }
    };

    OrdersTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        orders,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(delivered: bool) -> Order {
        serde_json::from_value(json!({
            "_id": "o1",
            "id": 42,
            "totalOrderPrice": 447,
            "paymentMethodType": "card",
            "isPaid": true,
            "isDelivered": delivered,
            "createdAt": "2024-03-05T10:00:00.000Z",
            "cartItems": [{
                "_id": "l1",
                "count": 3,
                "price": 149,
                "product": {
                    "_id": "p1",
                    "title": "Woman Shawl",
                    "imageCover": "https://img.example/p1.jpeg",
                    "category": {"_id": "c9", "name": "Women's Fashion"}
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_collapsed_order_hides_lines() {
        let view = OrderView::new(&order(false), None);
        assert_eq!(view.number, "#42");
        assert_eq!(view.delivery_status, "On The Way");
        assert_eq!(view.item_count, 1);
        assert!(view.lines.is_empty());
        assert_eq!(view.toggle_path(), "/allorders?expanded=o1");
    }

    #[test]
    fn test_expanded_order_shows_lines() {
        let view = OrderView::new(&order(true), Some("o1"));
        assert_eq!(view.delivery_status, "Delivered");
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].price, "149 EGP");
        assert_eq!(view.toggle_path(), "/allorders");
    }
}
