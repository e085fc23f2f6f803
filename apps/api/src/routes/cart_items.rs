//! # Cart Routes
//!
//! HTTP surface of the cart reconciler.
//!
//! ## Status Codes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST   /cart-items            201 new line │ 200 merged into existing  │
//! │                                400 bad quantity or unknown product      │
//! │  PUT    /cart-items/{id}       200 │ 404 no line │ 400 bad qty/option   │
//! │  DELETE /cart-items/{id}       204 │ 404 no line                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities arrive as raw JSON values so that `"3"`, `2.5` or `true`
//! produce a 400 with a readable message instead of a framework rejection.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ExpandQuery, IdInput};
use crate::error::ApiError;
use crate::AppState;
use shopline_core::validation::{parse_quantity, quantity_from_json};
use shopline_core::{CartItem, CartItemUpdate, CartListing, ValidationError};

// =============================================================================
// Request Bodies
// =============================================================================

/// `POST /cart-items` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: Option<IdInput>,
    #[serde(default)]
    pub quantity: Value,
}

/// `PUT /cart-items/{productId}` body. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub quantity: Option<Value>,
    pub delivery_option_id: Option<IdInput>,
}

impl UpdateCartItemRequest {
    /// Type-checks the body. Range and reference checks happen in the
    /// reconciler, after it has confirmed the line exists.
    fn into_update(self) -> Result<CartItemUpdate, ValidationError> {
        let quantity = self.quantity.as_ref().map(parse_quantity).transpose()?;
        Ok(CartItemUpdate {
            quantity,
            delivery_option_id: self.delivery_option_id.map(IdInput::into_string),
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /cart-items?expand=product`
pub async fn list_cart_items(
    State(state): State<AppState>,
    query: Result<Query<ExpandQuery>, QueryRejection>,
) -> Result<Json<CartListing>, ApiError> {
    let Query(query) = query?;
    debug!(expand = query.wants_products(), "list_cart_items");

    let listing = state.db.cart().list(query.wants_products()).await?;
    Ok(Json(listing))
}

/// `POST /cart-items`
pub async fn add_cart_item(
    State(state): State<AppState>,
    body: Result<Json<AddCartItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let Json(body) = body?;

    let product_id = body
        .product_id
        .map(IdInput::into_string)
        .ok_or_else(|| ValidationError::Required {
            field: "productId".to_string(),
        })?;
    let quantity = quantity_from_json(&body.quantity)?;

    debug!(product_id = %product_id, quantity, "add_cart_item");

    let addition = state
        .db
        .cart()
        .add(&product_id, quantity)
        .await
        .map_err(ApiError::from_body_reference)?;

    let status = if addition.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(addition.item)))
}

/// `PUT /cart-items/{productId}`
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    body: Result<Json<UpdateCartItemRequest>, JsonRejection>,
) -> Result<Json<CartItem>, ApiError> {
    let Json(body) = body?;
    let update = body.into_update()?;

    debug!(product_id = %product_id, ?update, "update_cart_item");

    let item = state.db.cart().update(&product_id, update).await?;
    Ok(Json(item))
}

/// `DELETE /cart-items/{productId}`
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(product_id = %product_id, "remove_cart_item");

    state.db.cart().remove(&product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
