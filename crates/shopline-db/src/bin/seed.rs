//! # Seed Data Loader
//!
//! Loads the default catalog, delivery options and sample orders into a
//! Shopline database.
//!
//! ## Usage
//! ```bash
//! # Seed ./shopline.db (only empty tables are filled)
//! cargo run -p shopline-db --bin seed
//!
//! # Seed a specific file and add the Black Tennis Shoes product
//! cargo run -p shopline-db --bin seed -- --db ./data/shop.db --add-product
//! ```

use shopline_db::seed::{black_tennis_shoes, seed_defaults};
use shopline_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let mut db_path =
        std::env::var("SHOPLINE_DB_PATH").unwrap_or_else(|_| "./shopline.db".to_string());
    let mut add_product = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--add-product" | "-a" => add_product = true,
            "--help" | "-h" => {
                println!("Shopline Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./shopline.db)");
                println!("  -a, --add-product    Also add the Black Tennis Shoes product");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Shopline Seed Data Loader");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let report = seed_defaults(&db).await?;
    if report.is_empty() {
        println!("⚠ Tables already populated, nothing to seed");
    } else {
        println!(
            "✓ Seeded {} products, {} delivery options, {} orders",
            report.products, report.delivery_options, report.orders
        );
    }

    if add_product {
        let product = black_tennis_shoes();
        match db.products().insert(&product).await {
            Ok(()) => println!("✓ Product added: {} ({})", product.name, product.id),
            Err(e) => eprintln!("Error adding product: {}", e),
        }
    }

    println!();
    println!("Catalog now holds {} products", db.products().count().await?);

    db.close().await;
    Ok(())
}
