//! # HTTP Routes
//!
//! Handlers grouped by resource.
//!
//! ```text
//! GET    /                          welcome
//! GET    /health                    store liveness
//! GET    /products?search=          products::list_products
//! GET    /delivery-options          delivery_options::list_delivery_options
//! GET    /cart-items?expand=product cart_items::list_cart_items
//! POST   /cart-items                cart_items::add_cart_item
//! PUT    /cart-items/{productId}    cart_items::update_cart_item
//! DELETE /cart-items/{productId}    cart_items::remove_cart_item
//! GET    /orders?expand=products    orders::list_orders
//! GET    /orders/{orderId}          orders::get_order
//! ```

pub mod cart_items;
pub mod delivery_options;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;

// =============================================================================
// Shared Request Types
// =============================================================================

/// An identifier sent as either a JSON string or a JSON integer.
///
/// `42` and `"42"` name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Text(String),
    Number(i64),
}

impl IdInput {
    pub fn into_string(self) -> String {
        match self {
            IdInput::Text(s) => s,
            IdInput::Number(n) => n.to_string(),
        }
    }
}

/// `?expand=` query parameter shared by cart and order listings.
#[derive(Debug, Default, Deserialize)]
pub struct ExpandQuery {
    pub expand: Option<String>,
}

impl ExpandQuery {
    /// `product` and `products` both request the join.
    pub fn wants_products(&self) -> bool {
        matches!(
            self.expand.as_deref().map(str::trim),
            Some("product") | Some("products")
        )
    }
}

// =============================================================================
// Service Routes
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Welcome {
    message: &'static str,
}

/// `GET /`
pub async fn welcome() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the Shopline backend!",
    })
}

/// `GET /health`: 200 when the store answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_input_accepts_strings_and_integers() {
        let id: IdInput = serde_json::from_str("42").unwrap();
        assert_eq!(id.into_string(), "42");

        let id: IdInput = serde_json::from_str("\"e43638ce\"").unwrap();
        assert_eq!(id.into_string(), "e43638ce");

        assert!(serde_json::from_str::<IdInput>("true").is_err());
    }

    #[test]
    fn test_expand_query() {
        let query = |v: Option<&str>| ExpandQuery {
            expand: v.map(str::to_string),
        };
        assert!(query(Some("product")).wants_products());
        assert!(query(Some("products")).wants_products());
        assert!(!query(Some("delivery")).wants_products());
        assert!(!query(None).wants_products());
    }
}
