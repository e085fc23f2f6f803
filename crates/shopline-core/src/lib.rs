//! # shopline-core: Domain Logic for the Shopline Storefront
//!
//! This crate holds the storefront's domain types and the rules that the
//! storage layer applies when it reconciles cart mutations and expands
//! records with product data. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /products  /delivery-options  /cart-items  /orders           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopline-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │  expand   │  │ validation│  │   │
//! │  │   │  Product  │  │  merge    │  │  product  │  │ quantity  │  │   │
//! │  │   │  Order    │  │  rules    │  │  joins    │  │ ids       │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopline-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, cart reconciler, orders      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, Order, ...)
//! - [`cart`] - Quantity merge policy and partial updates
//! - [`expand`] - Best-effort product joins for cart items and orders
//! - [`money`] - Integer-cents money type
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shopline_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(3).is_ok());
//! assert!(validate_quantity(11).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod expand;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartItemUpdate, QuantityOverflow};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest quantity a cart line may hold.
pub const MIN_ITEM_QUANTITY: i64 = 1;

/// Largest quantity accepted for a single add or update.
pub const MAX_ITEM_QUANTITY: i64 = 10;

/// Delivery option assigned to a cart item when it is first created.
pub const DEFAULT_DELIVERY_OPTION_ID: &str = "1";

/// Longest identifier accepted from a client.
pub const MAX_ID_LENGTH: usize = 64;
