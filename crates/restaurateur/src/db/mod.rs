//! Database operations for the Star Burger `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `product_categories` - Menu sections
//! - `products` - Dishes and their current list price
//! - `restaurants` - Kitchens with their geocoded location
//! - `menu_items` - Which restaurant sells which product, unique per pair
//! - `orders` / `order_lines` - Customer orders with captured line prices
//! - `addresses` - Geocoder cache keyed by free-text address
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` row
//! types), so the workspace builds without a live database. Row types are
//! private to each module and converted into `star_burger_core` models.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/restaurateur/migrations/` and run via:
//! ```bash
//! cargo run -p star-burger-cli -- migrate
//! ```

pub mod addresses;
pub mod menu;
pub mod orders;
pub mod products;
pub mod restaurants;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use star_burger_core::{Coordinate, CoordinateError};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Combine two nullable coordinate columns, flagging impossible values.
fn coordinate_from_columns(
    table: &str,
    key: impl std::fmt::Display,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinate>, RepositoryError> {
    Coordinate::from_parts(latitude, longitude).map_err(|e: CoordinateError| {
        RepositoryError::DataCorruption(format!("{table} {key}: {e}"))
    })
}

/// Split an optional coordinate into nullable columns for binding.
fn coordinate_columns(coordinate: Option<Coordinate>) -> (Option<f64>, Option<f64>) {
    coordinate.map_or((None, None), |c| (Some(c.latitude()), Some(c.longitude())))
}
