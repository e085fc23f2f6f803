//! # Repository Module
//!
//! Database repository implementations for Shopline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.cart().add("42", 3)                                        │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── validates input        (shopline_core::validation)                │
//! │  ├── checks references      (product.rs / delivery_option.rs helpers)  │
//! │  ├── merges quantities      (shopline_core::cart)                      │
//! │  └── writes in one transaction                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Expansion (expand=products) fetches every referenced product in one  │
//! │  query and joins with shopline_core::expand.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog lookup, search and maintenance
//! - [`delivery_option::DeliveryOptionRepository`] - Shipping speeds
//! - [`cart::CartRepository`] - The cart reconciler
//! - [`order::OrderRepository`] - Placed orders and their expansion

pub mod cart;
pub mod delivery_option;
pub mod order;
pub mod product;
