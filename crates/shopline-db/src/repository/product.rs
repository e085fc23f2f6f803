//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Lookup by id (single and batched for expansion)
//! - Substring search over name and keywords
//! - Insert / delete for seeding and catalog maintenance
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Search Works                                     │
//! │                                                                         │
//! │  GET /products?search=shoe                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  escape LIKE wildcards ( % _ \ ) → pattern "%shoe%"                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────┐              │
//! │  │ products                                              │              │
//! │  │ Black Tennis Shoes    | shoes,apparel,sports          │ ← name       │
//! │  │ Cotton Socks - 6 Pairs| socks,sports,apparel          │              │
//! │  │ Running Sneakers      | shoes,running                 │ ← keywords   │
//! │  └──────────────────────────────────────────────────────┘              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Case-insensitive for ASCII (SQLite LIKE). Catalog order preserved.    │
//! │  Empty or absent term → whole catalog.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, ShopResult};
use shopline_core::types::{join_keywords, parse_keywords};
use shopline_core::validation::validate_search_query;
use shopline_core::{Product, Rating};

/// Column list shared by every product SELECT.
const PRODUCT_COLUMNS: &str =
    "id, image, name, rating_stars, rating_count, price_cents, keywords, created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

/// Flat row as stored in `products`.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    image: String,
    name: String,
    rating_stars: f64,
    rating_count: i64,
    price_cents: i64,
    keywords: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            image: row.image,
            name: row.name,
            rating: Rating {
                stars: row.rating_stars,
                count: row.rating_count,
            },
            price_cents: row.price_cents,
            keywords: parse_keywords(&row.keywords),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.search(None).await?;
/// let shoes = repo.search(Some("shoe")).await?;
/// let product = repo.get_by_id("42").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches products by substring of name or keywords.
    ///
    /// `None` or an empty term returns the whole catalog. Other terms,
    /// whitespace included, are matched as given. Wildcards match literally.
    ///
    /// ## Errors
    /// - `ValidationError::TooLong` if the term is longer than 100 characters
    pub async fn search(&self, term: Option<&str>) -> ShopResult<Vec<Product>> {
        let Some(term) = validate_search_query(term)? else {
            return Ok(self.list_all().await?);
        };

        debug!(term = %term, "Searching products");

        let pattern = format!("%{}%", escape_like(&term));
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE name LIKE ?1 ESCAPE '\'
               OR keywords LIKE ?1 ESCAPE '\'
            ORDER BY rowid
            "
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(count = rows.len(), "Search returned products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Lists the whole catalog in insertion order.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Fetches every product whose id is in `ids`, in one query.
    ///
    /// Missing ids are simply absent from the result.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(requested = ids.len(), found = rows.len(), "Fetched products by id");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` if the id already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, image, name, rating_stars, rating_count,
                price_cents, keywords, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.image)
        .bind(&product.name)
        .bind(product.rating.stars)
        .bind(product.rating.count)
        .bind(product.price_cents)
        .bind(join_keywords(&product.keywords))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a product from the catalog.
    ///
    /// Cart lines and order lines that reference it are left in place and
    /// expand to `"product": null` afterwards.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Checks whether a product exists, on an open connection or transaction.
pub(crate) async fn product_exists(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(exists != 0)
}

/// Escapes `\`, `%` and `_` for use in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn product(id: &str, name: &str, keywords: &[&str]) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            image: format!("images/products/{}.jpg", id),
            name: name.to_string(),
            rating: Rating {
                stars: 4.5,
                count: 87,
            },
            price_cents: 1090,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn catalog() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product("42", "Black Tennis Shoes", &["shoes", "apparel", "sports"]))
            .await
            .unwrap();
        repo.insert(&product("7", "Cotton Socks", &["socks", "apparel"]))
            .await
            .unwrap();
        repo.insert(&product("9", "2 Slot Toaster", &["toaster", "kitchen"]))
            .await
            .unwrap();
        repo.insert(&product("10", "100% Wool Scarf", &["winter"]))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_by_id_round_trips_fields() {
        let db = catalog().await;

        let found = db.products().get_by_id("42").await.unwrap().unwrap();
        assert_eq!(found.name, "Black Tennis Shoes");
        assert_eq!(found.rating.count, 87);
        assert_eq!(found.keywords, vec!["shoes", "apparel", "sports"]);

        assert!(db.products().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_matches_name_or_keywords() {
        let db = catalog().await;
        let repo = db.products();

        let by_name: Vec<_> = repo.search(Some("toast")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "9");

        let by_keyword: Vec<_> = repo
            .search(Some("APPAREL"))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(by_keyword, vec!["42", "7"]);

        assert!(repo.search(Some("zzz")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_term_returns_everything() {
        let db = catalog().await;
        let repo = db.products();

        assert_eq!(repo.search(None).await.unwrap().len(), 4);
        assert_eq!(repo.search(Some("")).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_term_is_matched_as_given() {
        let db = catalog().await;
        let repo = db.products();

        let tennis: Vec<_> = repo
            .search(Some(" Tennis"))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(tennis, vec!["42"]);

        // Keywords are stored without spaces after the commas
        assert_eq!(repo.search(Some("sports")).await.unwrap().len(), 1);
        assert!(repo.search(Some(" sports")).await.unwrap().is_empty());
        assert!(repo.search(Some("  ")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_overlong_term() {
        let db = catalog().await;

        let err = db.products().search(Some(&"a".repeat(101))).await.unwrap_err();
        assert_eq!(err.kind(), shopline_core::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = catalog().await;
        let repo = db.products();

        let percent = repo.search(Some("100%")).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].id, "10");

        assert_eq!(repo.search(Some("%")).await.unwrap().len(), 1);
        assert!(repo.search(Some("_")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_skips_missing() {
        let db = catalog().await;

        let found = db
            .products()
            .get_many(&["7".to_string(), "ghost".to_string(), "9".to_string()])
            .await
            .unwrap();
        let mut ids: Vec<_> = found.into_iter().map(|p| p.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["7", "9"]);

        assert!(db.products().get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_duplicate_and_delete() {
        let db = catalog().await;
        let repo = db.products();

        let err = repo
            .insert(&product("42", "Copy", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        repo.delete("42").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 3);
        assert!(matches!(
            repo.delete("42").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("shoe"), "shoe");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
