//! # Domain Types
//!
//! Core domain types used throughout Shopline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │   │  id             │       │
//! │  │  name, image    │   │  quantity 1..10 │   │  order_time     │       │
//! │  │  rating         │   │  delivery_opt ──┼─┐ │  total_cost     │       │
//! │  │  price_cents    │   └─────────────────┘ │ │  products[] ────┼──┐    │
//! │  │  keywords       │◄──────────────────────┼─┼─────────────────┘  │    │
//! │  └─────────────────┘                       │ │  OrderProduct      │    │
//! │                        ┌─────────────────┐ │ │  (embedded lines)  │    │
//! │                        │ DeliveryOption  │◄┘ └────────────────────┘    │
//! │                        │  delivery_days  │                              │
//! │                        │  price_cents    │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expanded Views
//! `ExpandedCartItem` and `ExpandedOrder` are derived, never persisted. They
//! carry a `product` field that is `null` when the referenced product no
//! longer exists.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// Star rating shown on a product card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rating {
    /// Average stars, 0.0 to 5.0.
    pub stars: f64,
    /// Number of ratings.
    pub count: i64,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier.
    pub id: String,

    /// Relative image path, e.g. `images/products/black-tennis-shoes.jpg`.
    pub image: String,

    /// Display name.
    pub name: String,

    pub rating: Rating,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Search tags. Persisted as one comma-delimited string.
    pub keywords: Vec<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the keywords in their stored, comma-delimited form.
    pub fn keywords_string(&self) -> String {
        join_keywords(&self.keywords)
    }
}

/// Splits a stored keyword string into tags.
///
/// Empty segments and surrounding whitespace are dropped.
///
/// ## Example
/// ```rust
/// use shopline_core::types::parse_keywords;
///
/// assert_eq!(parse_keywords("shoes, apparel,,sports"), vec!["shoes", "apparel", "sports"]);
/// ```
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins tags into the stored comma-delimited form.
pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(",")
}

// =============================================================================
// Delivery Option
// =============================================================================

/// A shipping speed the customer can pick per cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOption {
    pub id: String,
    /// Estimated days from order to delivery.
    pub delivery_days: i64,
    pub price_cents: i64,
}

impl DeliveryOption {
    /// Estimated delivery time for an order placed at `ordered_at`.
    pub fn estimated_delivery_time(&self, ordered_at: DateTime<Utc>) -> DateTime<Utc> {
        ordered_at + Duration::days(self.delivery_days)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the cart. At most one exists per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    /// 1 to 10 when written through add/update.
    pub quantity: i64,
    pub delivery_option_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Cart line joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpandedCartItem {
    #[serde(flatten)]
    pub item: CartItem,
    /// `None` when the product has been removed from the catalog.
    pub product: Option<Product>,
}

/// Result of `GET /cart-items`, plain or expanded.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum CartListing {
    Items(Vec<CartItem>),
    Expanded(Vec<ExpandedCartItem>),
}

impl CartListing {
    /// Number of cart lines, regardless of expansion.
    pub fn len(&self) -> usize {
        match self {
            CartListing::Items(items) => items.len(),
            CartListing::Expanded(items) => items.len(),
        }
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of adding a product to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAddition {
    pub item: CartItem,
    /// `true` when a new line was inserted, `false` when an existing line grew.
    pub created: bool,
}

// =============================================================================
// Order
// =============================================================================

/// One embedded line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub product_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub estimated_delivery_time: DateTime<Utc>,
}

/// A placed order. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[ts(as = "String")]
    pub order_time: DateTime<Utc>,
    pub total_cost_cents: i64,
    /// Lines in the order they were placed. Stored as one JSON value.
    pub products: Vec<OrderProduct>,
}

impl Order {
    /// Returns the total cost as Money.
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }
}

/// Order line joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpandedOrderProduct {
    #[serde(flatten)]
    pub line: OrderProduct,
    /// `None` when the product has been removed from the catalog.
    pub product: Option<Product>,
}

/// Order with every line joined to its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedOrder {
    pub id: String,
    #[ts(as = "String")]
    pub order_time: DateTime<Utc>,
    pub total_cost_cents: i64,
    pub products: Vec<ExpandedOrderProduct>,
}

/// A single order, plain or expanded.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum OrderView {
    Plain(Order),
    Expanded(ExpandedOrder),
}

/// Result of `GET /orders`, plain or expanded.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum OrderListing {
    Orders(Vec<Order>),
    Expanded(Vec<ExpandedOrder>),
}

impl OrderListing {
    /// Number of orders, regardless of expansion.
    pub fn len(&self) -> usize {
        match self {
            OrderListing::Orders(orders) => orders.len(),
            OrderListing::Expanded(orders) => orders.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn shoes() -> Product {
        let now = Utc::now();
        Product {
            id: "42".to_string(),
            image: "images/products/black-tennis-shoes.jpg".to_string(),
            name: "Black Tennis Shoes".to_string(),
            rating: Rating {
                stars: 5.0,
                count: 100,
            },
            price_cents: 1999,
            keywords: vec!["shoes".into(), "apparel".into(), "sports".into()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_keywords_round_trip_through_storage_form() {
        let product = shoes();
        assert_eq!(product.keywords_string(), "shoes,apparel,sports");
        assert_eq!(parse_keywords(&product.keywords_string()), product.keywords);
        assert!(parse_keywords("").is_empty());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(shoes()).unwrap();
        assert_eq!(json["priceCents"], 1999);
        assert_eq!(json["rating"]["stars"], 5.0);
        assert_eq!(json["keywords"][2], "sports");
    }

    #[test]
    fn test_expanded_cart_item_flattens_and_keeps_null_product() {
        let now = Utc::now();
        let expanded = ExpandedCartItem {
            item: CartItem {
                id: "c1".into(),
                product_id: "gone".into(),
                quantity: 2,
                delivery_option_id: "1".into(),
                created_at: now,
                updated_at: now,
            },
            product: None,
        };

        let json = serde_json::to_value(&expanded).unwrap();
        assert_eq!(json["productId"], "gone");
        assert_eq!(json["quantity"], 2);
        assert!(json["product"].is_null());
        assert!(json.as_object().unwrap().contains_key("product"));
    }

    #[test]
    fn test_delivery_estimate_adds_days() {
        let option = DeliveryOption {
            id: "2".into(),
            delivery_days: 3,
            price_cents: 499,
        };
        let ordered = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 4, 12, 0, 0).unwrap();
        assert_eq!(option.estimated_delivery_time(ordered), expected);
    }

    #[test]
    fn test_listing_len() {
        assert!(CartListing::Items(vec![]).is_empty());
        assert_eq!(OrderListing::Expanded(vec![]).len(), 0);
    }
}
