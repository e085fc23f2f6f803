//! # Delivery Option Repository
//!
//! Shipping speeds a cart line can be assigned. The set is small and
//! effectively static: seeded once, read on every cart update and checkout
//! estimate.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use shopline_core::DeliveryOption;

/// Repository for delivery option database operations.
#[derive(Debug, Clone)]
pub struct DeliveryOptionRepository {
    pool: SqlitePool,
}

impl DeliveryOptionRepository {
    /// Creates a new DeliveryOptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryOptionRepository { pool }
    }

    /// Lists every delivery option in insertion order.
    pub async fn list(&self) -> DbResult<Vec<DeliveryOption>> {
        let options = sqlx::query_as::<_, DeliveryOption>(
            "SELECT id, delivery_days, price_cents FROM delivery_options ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }

    /// Gets a delivery option by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DeliveryOption>> {
        let option = sqlx::query_as::<_, DeliveryOption>(
            "SELECT id, delivery_days, price_cents FROM delivery_options WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(option)
    }

    /// Inserts a delivery option.
    pub async fn insert(&self, option: &DeliveryOption) -> DbResult<()> {
        debug!(id = %option.id, days = option.delivery_days, "Inserting delivery option");

        sqlx::query(
            "INSERT INTO delivery_options (id, delivery_days, price_cents) VALUES (?1, ?2, ?3)",
        )
        .bind(&option.id)
        .bind(option.delivery_days)
        .bind(option.price_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts delivery options.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delivery_options")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Checks whether a delivery option exists, on an open connection or
/// transaction.
pub(crate) async fn delivery_option_exists(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<bool> {
    let exists: i64 =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM delivery_options WHERE id = ?1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(exists != 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_list_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.delivery_options();

        for (id, days, price) in [("1", 7, 0), ("2", 3, 499)] {
            repo.insert(&DeliveryOption {
                id: id.into(),
                delivery_days: days,
                price_cents: price,
            })
            .await
            .unwrap();
        }

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "1");

        let express = repo.get_by_id("2").await.unwrap().unwrap();
        assert_eq!(express.delivery_days, 3);
        assert_eq!(express.price_cents, 499);

        assert!(repo.get_by_id("99").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 2);

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(delivery_option_exists(&mut conn, "1").await.unwrap());
        assert!(!delivery_option_exists(&mut conn, "99").await.unwrap());
    }
}
