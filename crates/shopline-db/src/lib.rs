//! # shopline-db: Database Layer for Shopline
//!
//! This crate provides persistence for the storefront: the catalog, the
//! shared cart and placed orders. It uses SQLite with sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopline Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /cart-items)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopline-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │   │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ DeliveryRepo   │   │              │  │   │
//! │  │   │ DbConfig      │    │ CartRepo       │   │              │  │   │
//! │  │   │               │    │ OrderRepo      │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                 ./shopline.db  (or :memory:)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Catalog, cart and order repositories
//! - [`seed`] - Default catalog and sample orders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopline_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./shopline.db")).await?;
//!
//! let shoes = db.products().search(Some("shoes")).await?;
//! let line = db.cart().add(&shoes[0].id, 2).await?;
//! let cart = db.cart().list(true).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ShopError, ShopResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::delivery_option::DeliveryOptionRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use seed::{seed_defaults, SeedReport};
