//! Delivery option routes.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::AppState;
use shopline_core::DeliveryOption;

/// `GET /delivery-options`
pub async fn list_delivery_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryOption>>, ApiError> {
    let options = state.db.delivery_options().list().await?;
    Ok(Json(options))
}
