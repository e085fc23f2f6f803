//! # Error Types
//!
//! Domain-specific error types for shopline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopline-core errors (this file)                                      │
//! │  ├── CoreError        - Domain rejections (missing rows, bad merges)   │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Client-facing classification                   │
//! │                                                                         │
//! │  shopline-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ShopError        - CoreError | DbError                            │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - Status code + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ShopError → ApiError → Client     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Client-facing classification of a failure.
///
/// `NotFound` and `InvalidArgument` carry a message safe to show to the
/// caller. `StoreUnavailable` never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced product, delivery option, cart item or order is missing.
    NotFound,
    /// Quantity out of range, wrong type, or a malformed identifier.
    InvalidArgument,
    /// Persistence failure.
    StoreUnavailable,
}

// =============================================================================
// Core Error
// =============================================================================

/// Domain rejections raised while reconciling carts or reading orders.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Delivery option id does not exist.
    ///
    /// Classified as an invalid argument: it only arises from a client
    /// supplying a bad reference in an update body.
    #[error("Delivery option not found: {0}")]
    DeliveryOptionNotFound(String),

    /// No cart item exists for the product.
    #[error("Cart item not found for product: {0}")]
    CartItemNotFound(String),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Adding to an existing cart line would push it past the maximum.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line: product 42, quantity 8
    ///      │
    ///      ▼
    /// add(42, 5) with QuantityOverflow::Reject
    ///      │
    ///      ▼
    /// QuantityOverflow { current: 8, added: 5, max: 10 }
    ///      │
    ///      ▼
    /// Line stays at 8, client gets 400
    /// ```
    #[error("Quantity for product {product_id} would exceed {max} (current {current}, adding {added})")]
    QuantityOverflow {
        product_id: String,
        current: i64,
        added: i64,
        max: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the client-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_)
            | CoreError::CartItemNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorKind::NotFound,
            CoreError::DeliveryOptionNotFound(_)
            | CoreError::QuantityOverflow { .. }
            | CoreError::Validation(_) => ErrorKind::InvalidArgument,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. a fractional quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
