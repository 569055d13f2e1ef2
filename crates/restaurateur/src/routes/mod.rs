//! HTTP route handlers for the restaurateur dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness probe
//! GET  /health/ready                  - Readiness probe (database ping)
//!
//! # Manager dashboard
//! GET  /manager/orders/               - Pending orders with candidate restaurants
//! GET  /manager/products/             - Product availability grid
//! GET  /manager/restaurants/          - Restaurant roster with locations
//!
//! # JSON API
//! GET  /manager/api/orders/rankings   - Ranked restaurants per pending order
//! ```

pub mod health;
pub mod orders;
pub mod products;
pub mod restaurants;

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

/// Create the manager dashboard router.
pub fn manager_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/", get(orders::index))
        .route("/products/", get(products::index))
        .route("/restaurants/", get(restaurants::index))
        .route("/api/orders/rankings", get(orders::rankings))
}

/// Create all routes for the dashboard.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/manager/orders/") }))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/manager", manager_routes())
}
