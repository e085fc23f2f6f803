//! # shopline-api
//!
//! HTTP layer for the Shopline storefront.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Client ──► CorsLayer ──► TraceLayer ──► Router                        │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                               handler (routes/*.rs)                    │
//! │                                            │  State<AppState>           │
//! │                                            ▼                            │
//! │                               Database (shopline-db)                   │
//! │                               products / cart / orders                 │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                               Json<T>  or  ApiError                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shopline_db::Database;

use crate::routes::{cart_items, delivery_options, orders, products};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,shopline=debug,tower_http=debug,sqlx=warn";

/// State shared by every handler.
///
/// The database handle is created once in `main`, passed in here and
/// closed after the server stops.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::welcome))
        .route("/health", get(routes::health))
        .route("/products", get(products::list_products))
        .route(
            "/delivery-options",
            get(delivery_options::list_delivery_options),
        )
        .route(
            "/cart-items",
            get(cart_items::list_cart_items).post(cart_items::add_cart_item),
        )
        .route(
            "/cart-items/{product_id}",
            put(cart_items::update_cart_item).delete(cart_items::remove_cart_item),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/{order_id}", get(orders::get_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initializes the tracing subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// Router Tests
// =============================================================================
