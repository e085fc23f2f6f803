//! # Product Expansion
//!
//! Joins cart lines and order lines with catalog products.
//!
//! ## Join Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Best-Effort Join                                     │
//! │                                                                         │
//! │  Repository                                                            │
//! │  ├── collects referenced product ids  (product_ids_for_*)              │
//! │  ├── fetches them in one query        → ProductIndex                   │
//! │  └── calls expand_* (THIS MODULE)                                      │
//! │                                                                         │
//! │  Line references product "42"  ── found  ──► product: { ... }          │
//! │  Line references product "99"  ── missing ─► product: null             │
//! │                                                                         │
//! │  A missing product never fails the listing; siblings are unaffected.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::types::{
    CartItem, ExpandedCartItem, ExpandedOrder, ExpandedOrderProduct, Order, Product,
};

/// Products keyed by id, as fetched for one expansion pass.
pub type ProductIndex = HashMap<String, Product>;

/// Builds an index from a product list.
pub fn index_products(products: impl IntoIterator<Item = Product>) -> ProductIndex {
    products.into_iter().map(|p| (p.id.clone(), p)).collect()
}

// =============================================================================
// Referenced Ids
// =============================================================================

/// Distinct product ids referenced by cart lines, sorted.
pub fn product_ids_for_cart(items: &[CartItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.product_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct product ids referenced by any line of any order, sorted.
pub fn product_ids_for_orders(orders: &[Order]) -> Vec<String> {
    orders
        .iter()
        .flat_map(|o| o.products.iter().map(|line| line.product_id.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Joins
// =============================================================================

/// Attaches products to cart lines, preserving line order.
pub fn expand_cart_items(items: Vec<CartItem>, products: &ProductIndex) -> Vec<ExpandedCartItem> {
    items
        .into_iter()
        .map(|item| {
            let product = products.get(&item.product_id).cloned();
            ExpandedCartItem { item, product }
        })
        .collect()
}

/// Attaches products to every line of an order.
///
/// The order's own fields and line fields are carried over untouched.
pub fn expand_order(order: Order, products: &ProductIndex) -> ExpandedOrder {
    let Order {
        id,
        order_time,
        total_cost_cents,
        products: lines,
    } = order;

    ExpandedOrder {
        id,
        order_time,
        total_cost_cents,
        products: lines
            .into_iter()
            .map(|line| {
                let product = products.get(&line.product_id).cloned();
                ExpandedOrderProduct { line, product }
            })
            .collect(),
    }
}

/// Expands every order, preserving order sequence.
pub fn expand_orders(orders: Vec<Order>, products: &ProductIndex) -> Vec<ExpandedOrder> {
    orders
        .into_iter()
        .map(|order| expand_order(order, products))
        .collect()
}

/// Counts lines whose product is missing. Used for logging dangling joins.
pub fn missing_in_cart(expanded: &[ExpandedCartItem]) -> usize {
    expanded.iter().filter(|e| e.product.is_none()).count()
}

/// Counts order lines whose product is missing.
pub fn missing_in_orders(expanded: &[ExpandedOrder]) -> usize {
    expanded
        .iter()
        .flat_map(|o| o.products.iter())
        .filter(|line| line.product.is_none())
        .count()
}

// =============================================================================
// Unit Tests
// =============================================================================
