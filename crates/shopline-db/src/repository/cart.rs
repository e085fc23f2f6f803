//! # Cart Repository
//!
//! The cart reconciler: applies add / update / remove to the shared cart
//! and lists it, optionally joined with products.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Line per Product                                │
//! │                                                                         │
//! │            add(p, q)                       update(p, {..})             │
//! │   ABSENT ─────────────► PRESENT(q) ◄──────────────────┐                │
//! │     ▲                     │    │                       │                │
//! │     │     remove(p)       │    └───────────────────────┘                │
//! │     └─────────────────────┘                                             │
//! │                           add(p, q2) → PRESENT(q + q2)  (overflow       │
//! │                                        policy applies above 10)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Each mutation runs its existence checks and its write inside one
//! `BEGIN IMMEDIATE` transaction, so concurrent mutations queue on the
//! SQLite write lock (bounded by the busy timeout) instead of failing. The
//! UNIQUE index on `cart_items.product_id` backs the
//! at-most-one-line-per-product invariant: a concurrent add that loses the
//! insert race falls back to merging into the winner's line.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbResult, ShopResult};
use crate::repository::delivery_option::delivery_option_exists;
use crate::repository::product::{product_exists, ProductRepository};
use shopline_core::expand::{expand_cart_items, index_products, missing_in_cart, product_ids_for_cart};
use shopline_core::validation::{validate_id, validate_quantity};
use shopline_core::{
    CartAddition, CartItem, CartItemUpdate, CartListing, CoreError, QuantityOverflow,
    DEFAULT_DELIVERY_OPTION_ID,
};

/// Cart mutations take the write lock before their first read.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

const CART_COLUMNS: &str = "id, product_id, quantity, delivery_option_id, created_at, updated_at";

/// Repository for cart operations.
///
/// ## Usage
/// ```rust,ignore
/// let cart = db.cart();
///
/// let added = cart.add("42", 3).await?;        // created
/// let merged = cart.add("42", 2).await?;       // quantity 5
/// cart.update("42", CartItemUpdate { delivery_option_id: Some("2".into()), ..Default::default() }).await?;
/// cart.remove("42").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
    overflow: QuantityOverflow,
}

impl CartRepository {
    /// Creates a new CartRepository with the default overflow policy.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository {
            pool,
            overflow: QuantityOverflow::default(),
        }
    }

    /// Sets what a repeated add does above the maximum quantity.
    pub fn with_overflow(mut self, overflow: QuantityOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists cart lines in the order they were first added.
    ///
    /// With `expand_product`, each line carries its product, or `null` when
    /// the product has since been removed from the catalog.
    pub async fn list(&self, expand_product: bool) -> DbResult<CartListing> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        if !expand_product {
            return Ok(CartListing::Items(items));
        }

        let ids = product_ids_for_cart(&items);
        let products = ProductRepository::new(self.pool.clone())
            .get_many(&ids)
            .await?;
        let expanded = expand_cart_items(items, &index_products(products));

        let missing = missing_in_cart(&expanded);
        if missing > 0 {
            warn!(missing, "Cart lines reference products no longer in the catalog");
        }

        Ok(CartListing::Expanded(expanded))
    }

    /// Gets the cart line for a product.
    pub async fn get(&self, product_id: &str) -> DbResult<Option<CartItem>> {
        let mut conn = self.pool.acquire().await?;
        find_by_product(&mut conn, product_id).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of a product to the cart.
    ///
    /// ## Behavior
    /// ```text
    /// no line for product  → insert { quantity, deliveryOptionId: "1" }, created = true
    /// line exists          → quantity merged per overflow policy,       created = false
    /// ```
    ///
    /// ## Errors
    /// - `ValidationError` - malformed id, or quantity outside 1..=10
    /// - `CoreError::ProductNotFound` - product not in catalog
    /// - `CoreError::QuantityOverflow` - merged sum above 10 under `Reject`
    pub async fn add(&self, product_id: &str, quantity: i64) -> ShopResult<CartAddition> {
        let product_id = validate_id("productId", product_id)?;
        validate_quantity(quantity)?;

        debug!(product_id = %product_id, quantity, "Adding to cart");

        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        if !product_exists(&mut tx, &product_id).await? {
            return Err(CoreError::ProductNotFound(product_id).into());
        }

        let now = Utc::now();
        let addition = match find_by_product(&mut tx, &product_id).await? {
            Some(existing) => self.merge(&mut tx, existing, quantity, now).await?,
            None => {
                let item = CartItem {
                    id: Uuid::new_v4().to_string(),
                    product_id: product_id.clone(),
                    quantity,
                    delivery_option_id: DEFAULT_DELIVERY_OPTION_ID.to_string(),
                    created_at: now,
                    updated_at: now,
                };

                if insert_if_absent(&mut tx, &item).await? {
                    CartAddition {
                        item,
                        created: true,
                    }
                } else {
                    // Lost the insert race to a concurrent add
                    let existing = find_by_product(&mut tx, &product_id)
                        .await?
                        .ok_or_else(|| CoreError::CartItemNotFound(product_id.clone()))?;
                    self.merge(&mut tx, existing, quantity, now).await?
                }
            }
        };

        tx.commit().await?;

        info!(
            product_id = %addition.item.product_id,
            quantity = addition.item.quantity,
            created = addition.created,
            "Cart line saved"
        );

        Ok(addition)
    }

    /// Applies a partial update to the cart line for a product.
    ///
    /// Omitted fields are left unchanged. Nothing is written when any check
    /// fails.
    ///
    /// ## Errors
    /// - `CoreError::CartItemNotFound` - no line for the product
    /// - `ValidationError` - quantity outside 1..=10 or malformed id
    /// - `CoreError::DeliveryOptionNotFound` - unknown delivery option
    pub async fn update(&self, product_id: &str, update: CartItemUpdate) -> ShopResult<CartItem> {
        let product_id = validate_id("productId", product_id)?;

        debug!(
            product_id = %product_id,
            quantity = ?update.quantity,
            delivery_option_id = ?update.delivery_option_id,
            "Updating cart line"
        );

        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        let existing = find_by_product(&mut tx, &product_id)
            .await?
            .ok_or_else(|| CoreError::CartItemNotFound(product_id.clone()))?;

        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
        }

        let delivery_option_id = update
            .delivery_option_id
            .as_deref()
            .map(|id| validate_id("deliveryOptionId", id))
            .transpose()?;

        if let Some(option_id) = &delivery_option_id {
            if !delivery_option_exists(&mut tx, option_id).await? {
                return Err(CoreError::DeliveryOptionNotFound(option_id.clone()).into());
            }
        }

        let update = CartItemUpdate {
            quantity: update.quantity,
            delivery_option_id,
        };
        if update.is_empty() {
            return Ok(existing);
        }

        let mut updated = update.apply_to(&existing);
        updated.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE cart_items
            SET quantity = ?2, delivery_option_id = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(updated.quantity)
        .bind(&updated.delivery_option_id)
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            product_id = %updated.product_id,
            quantity = updated.quantity,
            delivery_option_id = %updated.delivery_option_id,
            "Cart line updated"
        );

        Ok(updated)
    }

    /// Removes the cart line for a product.
    ///
    /// ## Errors
    /// - `CoreError::CartItemNotFound` - no line for the product
    pub async fn remove(&self, product_id: &str) -> ShopResult<()> {
        let product_id = validate_id("productId", product_id)?;

        debug!(product_id = %product_id, "Removing cart line");

        let result = sqlx::query("DELETE FROM cart_items WHERE product_id = ?1")
            .bind(&product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CartItemNotFound(product_id).into());
        }

        info!(product_id = %product_id, "Cart line removed");
        Ok(())
    }

    /// Grows an existing line by `added`, applying the overflow policy.
    async fn merge(
        &self,
        conn: &mut SqliteConnection,
        existing: CartItem,
        added: i64,
        now: DateTime<Utc>,
    ) -> ShopResult<CartAddition> {
        let quantity = self
            .overflow
            .merge(&existing.product_id, existing.quantity, added)?;

        if quantity > shopline_core::MAX_ITEM_QUANTITY {
            warn!(
                product_id = %existing.product_id,
                quantity,
                "Cart line stored above the maximum quantity"
            );
        }

        sqlx::query("UPDATE cart_items SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&existing.id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *conn)
            .await?;

        Ok(CartAddition {
            item: CartItem {
                quantity,
                updated_at: now,
                ..existing
            },
            created: false,
        })
    }

    /// Counts cart lines.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn find_by_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Option<CartItem>> {
    let item = sqlx::query_as::<_, CartItem>(&format!(
        "SELECT {CART_COLUMNS} FROM cart_items WHERE product_id = ?1"
    ))
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

/// Inserts a new line unless one already exists for the product.
///
/// Returns `false` when the UNIQUE index turned the insert into a no-op.
async fn insert_if_absent(conn: &mut SqliteConnection, item: &CartItem) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO cart_items (
            id, product_id, quantity, delivery_option_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(product_id) DO NOTHING
        "#,
    )
    .bind(&item.id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(&item.delivery_option_id)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopError;
    use crate::pool::{Database, DbConfig};
    use shopline_core::{DeliveryOption, ErrorKind, Product, Rating, ValidationError};

    fn product(id: &str, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            image: format!("images/products/{}.jpg", id),
            name: name.to_string(),
            rating: Rating {
                stars: 4.0,
                count: 12,
            },
            price_cents: 1999,
            keywords: vec!["test".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup_with(config: DbConfig) -> Database {
        let db = Database::new(config).await.unwrap();
        for (id, name) in [("42", "Black Tennis Shoes"), ("7", "Cotton Socks")] {
            db.products().insert(&product(id, name)).await.unwrap();
        }
        for (id, days, price) in [("1", 7, 0), ("2", 3, 499), ("3", 1, 999)] {
            db.delivery_options()
                .insert(&DeliveryOption {
                    id: id.into(),
                    delivery_days: days,
                    price_cents: price,
                })
                .await
                .unwrap();
        }
        db
    }

    async fn setup() -> Database {
        setup_with(DbConfig::in_memory()).await
    }

    fn items(listing: CartListing) -> Vec<CartItem> {
        match listing {
            CartListing::Items(items) => items,
            CartListing::Expanded(_) => panic!("expected plain listing"),
        }
    }

    #[tokio::test]
    async fn test_add_then_list_shows_exact_quantity() {
        for quantity in 1..=10 {
            let db = setup().await;

            let added = db.cart().add("42", quantity).await.unwrap();
            assert!(added.created);

            let listed = items(db.cart().list(false).await.unwrap());
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].product_id, "42");
            assert_eq!(listed[0].quantity, quantity);
            assert_eq!(listed[0].delivery_option_id, DEFAULT_DELIVERY_OPTION_ID);
        }
    }

    #[tokio::test]
    async fn test_repeated_add_merges_into_one_line() {
        let db = setup().await;
        let cart = db.cart();

        let first = cart.add("42", 4).await.unwrap();
        let second = cart.add("42", 6).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.item.id, first.item.id);
        assert_eq!(second.item.quantity, 10);
        assert_eq!(cart.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_input() {
        let db = setup().await;
        let cart = db.cart();

        for quantity in [0, -1, 11] {
            let err = cart.add("42", quantity).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let err = cart.add("999", 1).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Rejected(CoreError::ProductNotFound(ref id)) if id == "999"
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = cart.add("  ", 1).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Rejected(CoreError::Validation(ValidationError::Required { .. }))
        ));

        assert_eq!(cart.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overflow_reject_leaves_line_unchanged() {
        let db = setup().await;
        let cart = db.cart();

        cart.add("42", 8).await.unwrap();
        let err = cart.add("42", 5).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Rejected(CoreError::QuantityOverflow { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(cart.get("42").await.unwrap().unwrap().quantity, 8);
    }

    #[tokio::test]
    async fn test_overflow_clamp_and_allow() {
        let db = setup_with(DbConfig::in_memory().quantity_overflow(QuantityOverflow::Clamp)).await;
        db.cart().add("42", 8).await.unwrap();
        assert_eq!(db.cart().add("42", 5).await.unwrap().item.quantity, 10);

        let db = setup_with(DbConfig::in_memory().quantity_overflow(QuantityOverflow::Allow)).await;
        db.cart().add("42", 8).await.unwrap();
        assert_eq!(db.cart().add("42", 5).await.unwrap().item.quantity, 13);
        assert_eq!(db.cart().get("42").await.unwrap().unwrap().quantity, 13);
    }

    #[tokio::test]
    async fn test_update_out_of_range_leaves_line_unchanged() {
        let db = setup().await;
        let cart = db.cart();
        cart.add("42", 3).await.unwrap();

        for quantity in [0, 11, -1] {
            let err = cart
                .update(
                    "42",
                    CartItemUpdate {
                        quantity: Some(quantity),
                        delivery_option_id: Some("2".into()),
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let stored = cart.get("42").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 3);
        assert_eq!(stored.delivery_option_id, "1");
    }

    #[tokio::test]
    async fn test_update_unknown_delivery_option_is_invalid_argument() {
        let db = setup().await;
        let cart = db.cart();
        cart.add("42", 3).await.unwrap();

        let err = cart
            .update(
                "42",
                CartItemUpdate {
                    quantity: Some(4),
                    delivery_option_id: Some("99".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShopError::Rejected(CoreError::DeliveryOptionNotFound(_))
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(cart.get("42").await.unwrap().unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_update_missing_line_is_not_found() {
        let db = setup().await;

        let err = db
            .cart()
            .update(
                "42",
                CartItemUpdate {
                    quantity: Some(2),
                    delivery_option_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShopError::Rejected(CoreError::CartItemNotFound(_))
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_empty_update_returns_line_as_is() {
        let db = setup().await;
        let cart = db.cart();
        let added = cart.add("7", 2).await.unwrap();

        let same = cart.update("7", CartItemUpdate::default()).await.unwrap();
        assert_eq!(same, added.item);
    }

    #[tokio::test]
    async fn test_remove() {
        let db = setup().await;
        let cart = db.cart();

        let err = cart.remove("42").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        cart.add("42", 1).await.unwrap();
        cart.add("7", 1).await.unwrap();
        cart.remove("42").await.unwrap();

        let remaining = items(cart.list(false).await.unwrap());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product_id, "7");
    }

    #[tokio::test]
    async fn test_expansion_keeps_lines_for_deleted_products() {
        let db = setup().await;
        let cart = db.cart();
        cart.add("42", 2).await.unwrap();
        cart.add("7", 1).await.unwrap();

        db.products().delete("7").await.unwrap();

        let CartListing::Expanded(expanded) = cart.list(true).await.unwrap() else {
            panic!("expected expanded listing");
        };
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].item.product_id, "42");
        assert_eq!(
            expanded[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Black Tennis Shoes")
        );
        assert_eq!(expanded[1].item.product_id, "7");
        assert!(expanded[1].product.is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let db = setup().await;
        let cart = db.cart();
        cart.add("7", 1).await.unwrap();
        cart.add("42", 1).await.unwrap();
        cart.add("7", 1).await.unwrap();

        let ids: Vec<_> = items(cart.list(false).await.unwrap())
            .into_iter()
            .map(|i| i.product_id)
            .collect();
        assert_eq!(ids, vec!["7", "42"]);
    }

    async fn file_database(overflow: QuantityOverflow) -> (Database, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("shopline-cart-{}.db", Uuid::new_v4()));
        let db = setup_with(DbConfig::new(&path).quantity_overflow(overflow)).await;
        (db, path)
    }

    fn remove_database_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_keep_one_line() {
        const TASKS: i64 = 8;
        let (db, path) = file_database(QuantityOverflow::Allow).await;

        for round in 1..=5 {
            let tasks: Vec<_> = (0..TASKS)
                .map(|_| {
                    let cart = db.cart();
                    tokio::spawn(async move { cart.add("42", 1).await })
                })
                .collect();

            for task in tasks {
                let added = task.await.unwrap();
                assert!(added.is_ok(), "round {round}: {:?}", added.err());
            }

            let listed = items(db.cart().list(false).await.unwrap());
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].quantity, TASKS * round);
        }

        db.close().await;
        remove_database_files(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_all_succeed() {
        let (db, path) = file_database(QuantityOverflow::Reject).await;
        db.cart().add("42", 1).await.unwrap();
        db.cart().add("7", 1).await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let cart = db.cart();
                let product_id = if i % 2 == 0 { "42" } else { "7" };
                tokio::spawn(async move {
                    cart.update(
                        product_id,
                        CartItemUpdate {
                            quantity: Some(i % 10 + 1),
                            delivery_option_id: Some(((i % 3) + 1).to_string()),
                        },
                    )
                    .await
                })
            })
            .collect();

        for task in tasks {
            let updated = task.await.unwrap();
            assert!(updated.is_ok(), "{:?}", updated.err());
        }
        assert_eq!(db.cart().count().await.unwrap(), 2);

        db.close().await;
        remove_database_files(&path);
    }

    #[tokio::test]
    async fn test_cart_scenario_for_one_product() {
        let db = setup().await;
        let cart = db.cart();

        let created = cart.add("42", 3).await.unwrap();
        assert!(created.created);
        assert_eq!(created.item.quantity, 3);
        assert_eq!(created.item.delivery_option_id, "1");

        let merged = cart.add("42", 2).await.unwrap();
        assert!(!merged.created);
        assert_eq!(merged.item.id, created.item.id);
        assert_eq!(merged.item.quantity, 5);

        let updated = cart
            .update(
                "42",
                CartItemUpdate {
                    quantity: None,
                    delivery_option_id: Some("2".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.delivery_option_id, "2");

        cart.remove("42").await.unwrap();
        assert!(cart.list(false).await.unwrap().is_empty());
    }
}
