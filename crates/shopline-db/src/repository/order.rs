//! # Order Repository
//!
//! Reads placed orders and expands their lines with live product data.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                                                                 │
//! │  ┌──────────┬──────────────────────┬──────────────────┬──────────────┐ │
//! │  │ id       │ order_time           │ total_cost_cents │ products     │ │
//! │  ├──────────┼──────────────────────┼──────────────────┼──────────────┤ │
//! │  │ 27cba69d │ 2024-06-01T12:00:00Z │ 3506             │ [{...},{..}] │ │
//! │  └──────────┴──────────────────────┴──────────────────┴──────────────┘ │
//! │                                                          │              │
//! │  Lines are one JSON array, never a join table:          ▼              │
//! │  [{"productId":"42","quantity":2,"estimatedDeliveryTime":"..."}]       │
//! │                                                                         │
//! │  Orders are immutable once inserted. Expansion decorates the read     │
//! │  result and never writes back.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult, ShopResult};
use crate::repository::product::ProductRepository;
use shopline_core::expand::{
    expand_order, expand_orders, index_products, missing_in_orders, product_ids_for_orders,
};
use shopline_core::validation::validate_id;
use shopline_core::{CoreError, Order, OrderListing, OrderProduct, OrderView};

const ORDER_COLUMNS: &str = "id, order_time, total_cost_cents, products";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    order_time: DateTime<Utc>,
    total_cost_cents: i64,
    products: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let products: Vec<OrderProduct> = serde_json::from_str(&row.products)
            .map_err(|e| DbError::corrupt("Order", &row.id, e))?;

        Ok(Order {
            id: row.id,
            order_time: row.order_time,
            total_cost_cents: row.total_cost_cents,
            products,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists orders, newest first.
    ///
    /// With `expand_products`, every line of every order carries its
    /// product, or `null` when the product no longer exists. One product
    /// query serves the whole listing.
    pub async fn list(&self, expand_products: bool) -> DbResult<OrderListing> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_time DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = orders.len(), expand_products, "Listed orders");

        if !expand_products {
            return Ok(OrderListing::Orders(orders));
        }

        let ids = product_ids_for_orders(&orders);
        let products = ProductRepository::new(self.pool.clone())
            .get_many(&ids)
            .await?;
        let expanded = expand_orders(orders, &index_products(products));

        let missing = missing_in_orders(&expanded);
        if missing > 0 {
            warn!(missing, "Order lines reference products no longer in the catalog");
        }

        Ok(OrderListing::Expanded(expanded))
    }

    /// Gets one order, optionally expanded.
    ///
    /// ## Errors
    /// - `CoreError::OrderNotFound` - no order with that id
    pub async fn get(&self, id: &str, expand_products: bool) -> ShopResult<OrderView> {
        let id = validate_id("orderId", id)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(&id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(id.clone()))?;

        let order = Order::try_from(row)?;

        if !expand_products {
            return Ok(OrderView::Plain(order));
        }

        let ids = product_ids_for_orders(std::slice::from_ref(&order));
        let products = ProductRepository::new(self.pool.clone())
            .get_many(&ids)
            .await?;

        Ok(OrderView::Expanded(expand_order(
            order,
            &index_products(products),
        )))
    }

    /// Inserts an order with its embedded lines.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, lines = order.products.len(), "Inserting order");

        let products = serde_json::to_string(&order.products)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            "INSERT INTO orders (id, order_time, total_cost_cents, products) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&order.id)
        .bind(order.order_time)
        .bind(order.total_cost_cents)
        .bind(products)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopError;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use shopline_core::{ErrorKind, Product, Rating};

    fn product(id: &str, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            image: format!("images/products/{}.jpg", id),
            name: name.to_string(),
            rating: Rating {
                stars: 4.5,
                count: 56,
            },
            price_cents: 1090,
            keywords: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn order(id: &str, placed: DateTime<Utc>, lines: &[(&str, i64)]) -> Order {
        Order {
            id: id.to_string(),
            order_time: placed,
            total_cost_cents: 3506,
            products: lines
                .iter()
                .map(|(pid, qty)| OrderProduct {
                    product_id: pid.to_string(),
                    quantity: *qty,
                    estimated_delivery_time: placed + Duration::days(3),
                })
                .collect(),
        }
    }

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("42", "Black Tennis Shoes")).await.unwrap();
        db.products().insert(&product("7", "Cotton Socks")).await.unwrap();

        let older = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();
        db.orders()
            .insert(&order("old", older, &[("42", 2), ("gone", 1)]))
            .await
            .unwrap();
        db.orders()
            .insert(&order("new", newer, &[("7", 1)]))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_list_newest_first_without_expansion() {
        let db = setup().await;

        let OrderListing::Orders(orders) = db.orders().list(false).await.unwrap() else {
            panic!("expected plain orders");
        };
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(orders[1].products.len(), 2);
        assert_eq!(orders[1].products[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_expansion_joins_and_tolerates_missing_products() {
        let db = setup().await;

        let OrderListing::Expanded(orders) = db.orders().list(true).await.unwrap() else {
            panic!("expected expanded orders");
        };
        let old = &orders[1];
        assert_eq!(old.id, "old");
        assert_eq!(old.total_cost_cents, 3506);
        assert_eq!(old.products[0].line.product_id, "42");
        assert_eq!(old.products[0].line.quantity, 2);
        assert_eq!(
            old.products[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Black Tennis Shoes")
        );
        assert_eq!(old.products[1].line.product_id, "gone");
        assert!(old.products[1].product.is_none());
    }

    #[tokio::test]
    async fn test_expansion_does_not_modify_stored_orders() {
        let db = setup().await;

        let before = db.orders().list(false).await.unwrap();
        db.orders().list(true).await.unwrap();
        let after = db.orders().list(false).await.unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_get_single_order() {
        let db = setup().await;

        let OrderView::Plain(order) = db.orders().get("old", false).await.unwrap() else {
            panic!("expected plain order");
        };
        assert_eq!(order.products.len(), 2);

        let OrderView::Expanded(order) = db.orders().get("new", true).await.unwrap() else {
            panic!("expected expanded order");
        };
        assert_eq!(order.products[0].product.as_ref().unwrap().id, "7");

        let err = db.orders().get("missing", false).await.unwrap_err();
        assert!(matches!(err, ShopError::Rejected(CoreError::OrderNotFound(_))));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_corrupt_order_lines_are_reported() {
        let db = setup().await;
        sqlx::query(
            "INSERT INTO orders (id, order_time, total_cost_cents, products) VALUES ('bad', ?1, 0, 'not json')",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.orders().list(false).await.unwrap_err();
        assert!(matches!(err, DbError::DataCorruption { ref id, .. } if id == "bad"));
    }
}
