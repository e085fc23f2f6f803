//! # Validation Module
//!
//! Input validation for cart mutations, identifiers and catalog search.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (apps/api)                                    │
//! │  └── JSON shape only; numbers are kept as raw JSON values              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── quantity is an integer in [1, 10]                                 │
//! │  └── identifiers are non-empty and bounded                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repositories (shopline-db)                                   │
//! │  ├── referenced product / delivery option exists                       │
//! │  └── UNIQUE(product_id) on cart_items                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;

use crate::error::ValidationError;
use crate::{MAX_ID_LENGTH, MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest search term accepted.
pub const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// Quantity
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be between 1 and 10 inclusive
///
/// ## Example
/// ```rust
/// use shopline_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(10).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(11).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_ITEM_QUANTITY,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Reads a quantity from a raw JSON value without range checking.
///
/// Accepts JSON integers and floats with no fractional part (`3.0`).
/// Strings, booleans, fractions and `null` are rejected.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use shopline_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(&json!(3)).unwrap(), 3);
/// assert_eq!(parse_quantity(&json!(40)).unwrap(), 40);
/// assert!(parse_quantity(&json!(2.5)).is_err());
/// assert!(parse_quantity(&json!("3")).is_err());
/// ```
pub fn parse_quantity(value: &Value) -> ValidationResult<i64> {
    match value {
        Value::Null => Err(ValidationError::Required {
            field: "quantity".to_string(),
        }),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(i),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
            _ => Err(not_an_integer()),
        },
        _ => Err(not_an_integer()),
    }
}

/// Reads a quantity from a raw JSON value and checks it is in 1..=10.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use shopline_core::validation::quantity_from_json;
///
/// assert_eq!(quantity_from_json(&json!(3)).unwrap(), 3);
/// assert!(quantity_from_json(&json!(11)).is_err());
/// ```
pub fn quantity_from_json(value: &Value) -> ValidationResult<i64> {
    let qty = parse_quantity(value)?;
    validate_quantity(qty)?;
    Ok(qty)
}

fn not_an_integer() -> ValidationError {
    ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: "must be an integer".to_string(),
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a client-supplied identifier and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 64 characters
///
/// ## Example
/// ```rust
/// use shopline_core::validation::validate_id;
///
/// assert_eq!(validate_id("productId", " 42 ").unwrap(), "42");
/// assert!(validate_id("productId", "   ").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.chars().count() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    Ok(id.to_string())
}

// =============================================================================
// Search
// =============================================================================

/// Checks a catalog search term.
///
/// ## Rules
/// - Absent or empty terms mean "no filter" (`None`)
/// - Anything else is matched as given, surrounding whitespace included
/// - Maximum 100 characters
pub fn validate_search_query(term: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(term) = term.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if term.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(Some(term.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
