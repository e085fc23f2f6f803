//! # Cart Rules
//!
//! Pure rules the cart reconciler applies inside its transactions.
//!
//! ## Repeated Add
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(product 42, qty 3)   → line { 42, qty 3 }        (created)        │
//! │  add(product 42, qty 2)   → line { 42, qty 5 }        (merged)         │
//! │  add(product 42, qty 7)   → 5 + 7 = 12 > 10                            │
//! │                             ├── Reject: error, line stays 5            │
//! │                             ├── Clamp:  line becomes 10                │
//! │                             └── Allow:  line becomes 12                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::CartItem;
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Overflow Policy
// =============================================================================

/// What to do when a repeated add pushes a line past the maximum quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityOverflow {
    /// Fail with `CoreError::QuantityOverflow`; the line is left unchanged.
    #[default]
    Reject,
    /// Cap the line at the maximum quantity.
    Clamp,
    /// Store the raw sum, even above the maximum.
    Allow,
}

impl QuantityOverflow {
    /// Combines an existing line quantity with an added quantity.
    ///
    /// `added` is expected to have passed `validate_quantity` already.
    ///
    /// ## Example
    /// ```rust
    /// use shopline_core::QuantityOverflow;
    ///
    /// assert_eq!(QuantityOverflow::Reject.merge("42", 3, 2).unwrap(), 5);
    /// assert!(QuantityOverflow::Reject.merge("42", 8, 5).is_err());
    /// assert_eq!(QuantityOverflow::Clamp.merge("42", 8, 5).unwrap(), 10);
    /// assert_eq!(QuantityOverflow::Allow.merge("42", 8, 5).unwrap(), 13);
    /// ```
    pub fn merge(self, product_id: &str, current: i64, added: i64) -> CoreResult<i64> {
        let sum = current.saturating_add(added);
        if sum <= MAX_ITEM_QUANTITY {
            return Ok(sum);
        }

        match self {
            QuantityOverflow::Reject => Err(CoreError::QuantityOverflow {
                product_id: product_id.to_string(),
                current,
                added,
                max: MAX_ITEM_QUANTITY,
            }),
            QuantityOverflow::Clamp => Ok(MAX_ITEM_QUANTITY.max(current)),
            QuantityOverflow::Allow => Ok(sum),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityOverflow::Reject => "reject",
            QuantityOverflow::Clamp => "clamp",
            QuantityOverflow::Allow => "allow",
        }
    }
}

impl fmt::Display for QuantityOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityOverflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(QuantityOverflow::Reject),
            "clamp" => Ok(QuantityOverflow::Clamp),
            "allow" => Ok(QuantityOverflow::Allow),
            other => Err(format!(
                "unknown quantity overflow policy '{}' (expected reject, clamp or allow)",
                other
            )),
        }
    }
}

// =============================================================================
// Partial Update
// =============================================================================

/// Validated partial update of a cart line.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartItemUpdate {
    pub quantity: Option<i64>,
    pub delivery_option_id: Option<String>,
}

impl CartItemUpdate {
    /// Checks if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.delivery_option_id.is_none()
    }

    /// Returns a copy of `item` with the provided fields replaced.
    pub fn apply_to(&self, item: &CartItem) -> CartItem {
        let mut updated = item.clone();
        if let Some(quantity) = self.quantity {
            updated.quantity = quantity;
        }
        if let Some(option_id) = &self.delivery_option_id {
            updated.delivery_option_id = option_id.clone();
        }
        updated
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(quantity: i64) -> CartItem {
        let now = Utc::now();
        CartItem {
            id: "c1".into(),
            product_id: "42".into(),
            quantity,
            delivery_option_id: "1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_merge_within_bounds_is_plain_sum() {
        for policy in [
            QuantityOverflow::Reject,
            QuantityOverflow::Clamp,
            QuantityOverflow::Allow,
        ] {
            assert_eq!(policy.merge("42", 3, 2).unwrap(), 5);
            assert_eq!(policy.merge("42", 5, 5).unwrap(), 10);
        }
    }

    #[test]
    fn test_merge_overflow_policies() {
        let err = QuantityOverflow::Reject.merge("42", 9, 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::QuantityOverflow {
                current: 9,
                added: 2,
                max: 10,
                ..
            }
        ));

        assert_eq!(QuantityOverflow::Clamp.merge("42", 9, 2).unwrap(), 10);
        assert_eq!(QuantityOverflow::Allow.merge("42", 9, 2).unwrap(), 11);
    }

    #[test]
    fn test_clamp_never_shrinks_an_already_large_line() {
        assert_eq!(QuantityOverflow::Clamp.merge("42", 12, 1).unwrap(), 12);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("reject".parse::<QuantityOverflow>(), Ok(QuantityOverflow::Reject));
        assert_eq!(" Clamp ".parse::<QuantityOverflow>(), Ok(QuantityOverflow::Clamp));
        assert_eq!("ALLOW".parse::<QuantityOverflow>(), Ok(QuantityOverflow::Allow));
        assert!("sometimes".parse::<QuantityOverflow>().is_err());
        assert_eq!(QuantityOverflow::default(), QuantityOverflow::Reject);
    }

    #[test]
    fn test_partial_update_leaves_omitted_fields() {
        let item = line(5);

        let update = CartItemUpdate {
            quantity: None,
            delivery_option_id: Some("2".into()),
        };
        let updated = update.apply_to(&item);
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.delivery_option_id, "2");

        let update = CartItemUpdate {
            quantity: Some(7),
            delivery_option_id: None,
        };
        let updated = update.apply_to(&item);
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.delivery_option_id, "1");

        assert!(CartItemUpdate::default().is_empty());
    }
}
