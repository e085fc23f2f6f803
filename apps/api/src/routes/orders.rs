//! Order routes. Orders are read-only over HTTP.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::debug;

use super::ExpandQuery;
use crate::error::ApiError;
use crate::AppState;
use shopline_core::{OrderListing, OrderView};

/// `GET /orders?expand=products`
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<ExpandQuery>, QueryRejection>,
) -> Result<Json<OrderListing>, ApiError> {
    let Query(query) = query?;
    debug!(expand = query.wants_products(), "list_orders");

    let orders = state.db.orders().list(query.wants_products()).await?;
    Ok(Json(orders))
}

/// `GET /orders/{orderId}?expand=products`
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    query: Result<Query<ExpandQuery>, QueryRejection>,
) -> Result<Json<OrderView>, ApiError> {
    let Query(query) = query?;
    debug!(order_id = %order_id, expand = query.wants_products(), "get_order");

    let order = state
        .db
        .orders()
        .get(&order_id, query.wants_products())
        .await?;
    Ok(Json(order))
}
