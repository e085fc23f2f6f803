//! Catalog routes.

use axum::extract::{Query, State};
use axum::extract::rejection::QueryRejection;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;
use shopline_core::Product;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// `GET /products?search=term`
///
/// Without a term (or with an empty one) the whole catalog is returned.
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    debug!(search = ?query.search, "list_products");

    let products = state.db.products().search(query.search.as_deref()).await?;
    Ok(Json(products))
}
