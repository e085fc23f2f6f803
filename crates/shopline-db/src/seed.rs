//! # Default Data
//!
//! The starter catalog, the three delivery speeds and a pair of sample
//! orders. Loaded at API startup (when enabled) and by the `seed` binary.
//!
//! Each table is only seeded when it is empty, so running this against a
//! live database is a no-op.

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::product::generate_product_id;
use shopline_core::{DeliveryOption, Money, Order, OrderProduct, Product, Rating};

/// What a seeding pass inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub products: usize,
    pub delivery_options: usize,
    pub orders: usize,
}

impl SeedReport {
    /// Checks if nothing was inserted.
    pub fn is_empty(&self) -> bool {
        self.products == 0 && self.delivery_options == 0 && self.orders == 0
    }
}

/// Seeds every empty table with its defaults.
///
/// Sample orders are only created alongside a freshly seeded catalog so
/// they never reference products an operator has replaced.
pub async fn seed_defaults(db: &Database) -> DbResult<SeedReport> {
    let mut report = SeedReport::default();

    if db.delivery_options().count().await? == 0 {
        for option in default_delivery_options() {
            db.delivery_options().insert(&option).await?;
            report.delivery_options += 1;
        }
    }

    if db.products().count().await? == 0 {
        for product in default_products() {
            db.products().insert(&product).await?;
            report.products += 1;
        }

        if db.orders().count().await? == 0 {
            for order in sample_orders(&default_products(), &default_delivery_options()) {
                db.orders().insert(&order).await?;
                report.orders += 1;
            }
        }
    }

    if report.is_empty() {
        info!("Database already seeded");
    } else {
        info!(
            products = report.products,
            delivery_options = report.delivery_options,
            orders = report.orders,
            "Seeded default data"
        );
    }

    Ok(report)
}

// =============================================================================
// Catalog
// =============================================================================

/// Standard, express and overnight shipping.
pub fn default_delivery_options() -> Vec<DeliveryOption> {
    [("1", 7, 0), ("2", 3, 499), ("3", 1, 999)]
        .into_iter()
        .map(|(id, days, price)| DeliveryOption {
            id: id.to_string(),
            delivery_days: days,
            price_cents: price,
        })
        .collect()
}

/// The starter catalog.
pub fn default_products() -> Vec<Product> {
    let now = Utc::now();
    let product = |id: &str, image: &str, name: &str, stars: f64, count: i64, price: i64, keywords: &[&str]| {
        Product {
            id: id.to_string(),
            image: image.to_string(),
            name: name.to_string(),
            rating: Rating { stars, count },
            price_cents: price,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    };

    vec![
        product(
            "e43638ce-6aa0-4b85-b27f-e1d07eb678c6",
            "images/products/athletic-cotton-socks-6-pairs.jpg",
            "Black and Gray Athletic Cotton Socks - 6 Pairs",
            4.5,
            87,
            1090,
            &["socks", "sports", "apparel"],
        ),
        product(
            "15b6fc6f-327a-4ec4-896f-486349e85a3d",
            "images/products/intermediate-composite-basketball.jpg",
            "Intermediate Size Basketball",
            4.0,
            127,
            2095,
            &["sports", "basketballs"],
        ),
        product(
            "83d4ca15-0f35-48f5-b7a3-1ea210004f2e",
            "images/products/adults-plain-cotton-tshirt-2-pack-teal.jpg",
            "Adults Plain Cotton T-Shirt - 2 Pack",
            4.5,
            56,
            799,
            &["tshirts", "apparel", "mens"],
        ),
        product(
            "54e0eccd-8f36-462b-b68a-8182611d9add",
            "images/products/black-2-slot-toaster.jpg",
            "2 Slot Toaster - Black",
            5.0,
            2197,
            1899,
            &["toaster", "kitchen", "appliances"],
        ),
    ]
}

/// The product added by `seed --add-product`. Gets a fresh id every call.
pub fn black_tennis_shoes() -> Product {
    let now = Utc::now();
    Product {
        id: generate_product_id(),
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

// =============================================================================
// Sample Orders
// =============================================================================

/// Two past orders built from the given catalog.
///
/// Totals are item cost plus one delivery charge per line.
fn sample_orders(products: &[Product], options: &[DeliveryOption]) -> Vec<Order> {
    let now = Utc::now();
    let plans: [(i64, &[(usize, i64, usize)]); 2] = [
        (9, &[(0, 2, 0), (1, 1, 1)]),
        (2, &[(3, 1, 2)]),
    ];

    plans
        .iter()
        .filter_map(|(days_ago, lines)| {
            let placed = now - Duration::days(*days_ago);
            let mut total = Money::zero();
            let mut products_out = Vec::with_capacity(lines.len());

            for &(product_idx, quantity, option_idx) in lines.iter() {
                let product = products.get(product_idx)?;
                let option = options.get(option_idx)?;
                total += product.price() * quantity + Money::from_cents(option.price_cents);
                products_out.push(OrderProduct {
                    product_id: product.id.clone(),
                    quantity,
                    estimated_delivery_time: option.estimated_delivery_time(placed),
                });
            }

            Some(Order {
                id: Uuid::new_v4().to_string(),
                order_time: placed,
                total_cost_cents: total.cents(),
                products: products_out,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use shopline_core::OrderListing;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_defaults(&db).await.unwrap();
        assert_eq!(first.products, 4);
        assert_eq!(first.delivery_options, 3);
        assert_eq!(first.orders, 2);

        let second = seed_defaults(&db).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(db.products().count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sample_orders_reference_seeded_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_defaults(&db).await.unwrap();

        let OrderListing::Expanded(orders) = db.orders().list(true).await.unwrap() else {
            panic!("expected expanded orders");
        };
        assert_eq!(orders.len(), 2);
        assert!(orders
            .iter()
            .flat_map(|o| o.products.iter())
            .all(|line| line.product.is_some()));
    }

    #[test]
    fn test_sample_order_totals() {
        let orders = sample_orders(&default_products(), &default_delivery_options());

        // 2 × 1090 + 0  +  1 × 2095 + 499
        assert_eq!(orders[0].total_cost_cents, 4774);
        // 1 × 1899 + 999
        assert_eq!(orders[1].total_cost_cents, 2898);
    }

    #[test]
    fn test_black_tennis_shoes() {
        let a = black_tennis_shoes();
        let b = black_tennis_shoes();
        assert_ne!(a.id, b.id);
        assert_eq!(a.keywords_string(), "shoes,apparel,sports");
        assert_eq!(a.price_cents, 1999);
    }
}
