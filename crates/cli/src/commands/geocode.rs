//! Geocoding backfill commands.
//!
//! Fills in coordinates the dashboard needs but never fetches itself:
//! restaurant locations and delivery addresses of pending orders.
//!
//! # Usage
//!
//! ```bash
//! # Locate restaurants that have no coordinates yet
//! sb-cli geocode restaurants
//!
//! # Re-locate every restaurant
//! sb-cli geocode restaurants --all
//!
//! # Locate delivery addresses of pending orders
//! sb-cli geocode orders
//! ```
//!
//! # Environment Variables
//!
//! - `RESTAURATEUR_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `YANDEX_GEO_APIKEY` - Yandex geocoder API key (required here)

use std::collections::BTreeSet;

use tracing::{info, warn};

use star_burger_restaurateur::config::{ConfigError, RestaurateurConfig};
use star_burger_restaurateur::db::{self, RepositoryError};
use star_burger_restaurateur::geocoder::{GeocoderClient, GeocoderError};
use star_burger_restaurateur::services::CoordinateCache;

/// Errors that stop a backfill.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("YANDEX_GEO_APIKEY is not set; geocoding is disabled")]
    GeocoderDisabled,

    #[error("Geocoder error: {0}")]
    Geocoder(#[from] GeocoderError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// How many addresses a backfill tried and how many it located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempted: usize,
    pub located: usize,
}

impl Tally {
    const fn record(&mut self, located: bool) {
        self.attempted += 1;
        if located {
            self.located += 1;
        }
    }
}

/// Build a coordinate cache with a live geocoder.
///
/// # Errors
///
/// Returns an error if no API key is configured or the database is unreachable.
pub async fn connect() -> Result<CoordinateCache, GeocodeError> {
    let config = RestaurateurConfig::from_env()?;
    config.log_geocoder_state();
    let geocoder_config = config.geocoder().ok_or(GeocodeError::GeocoderDisabled)?;
    let geocoder = GeocoderClient::new(geocoder_config)?;
    let pool = db::create_pool(&config.database_url).await?;

    Ok(CoordinateCache::new(
        pool,
        Some(geocoder),
        config.coordinate_cache_capacity,
    ))
}

/// Geocode restaurant addresses and store the result on each restaurant.
///
/// With `all` unset, only restaurants without coordinates are touched.
///
/// # Errors
///
/// Returns an error if the database fails. Geocoder failures are logged and
/// counted as not located.
pub async fn restaurants(cache: &CoordinateCache, all: bool) -> Result<Tally, GeocodeError> {
    let pool = cache.pool();
    let restaurants = if all {
        db::restaurants::all(pool).await?
    } else {
        db::restaurants::missing_coordinates(pool).await?
    };
    info!(count = restaurants.len(), "Geocoding restaurants");

    let mut tally = Tally::default();
    for restaurant in &restaurants {
        let located = cache.geocode_restaurant(restaurant).await?;
        if located.is_none() {
            warn!(restaurant = %restaurant.name, address = %restaurant.address, "Restaurant not located");
        }
        tally.record(located.is_some());
    }

    info!(
        attempted = tally.attempted,
        located = tally.located,
        "Restaurant geocoding complete"
    );
    Ok(tally)
}

/// Locate the delivery address of every pending order.
///
/// # Errors
///
/// Returns an error if the database fails. Geocoder failures are logged and
/// counted as not located.
pub async fn orders(cache: &CoordinateCache) -> Result<Tally, GeocodeError> {
    let pending = db::orders::pending(cache.pool()).await?;
    let addresses = distinct_addresses(pending.iter().map(|order| order.address.as_str()));
    info!(
        orders = pending.len(),
        addresses = addresses.len(),
        "Geocoding order addresses"
    );

    let mut tally = Tally::default();
    for address in &addresses {
        let located = cache.locate(address).await?;
        tally.record(located.is_some());
    }

    info!(
        attempted = tally.attempted,
        located = tally.located,
        "Order address geocoding complete"
    );
    Ok(tally)
}

/// Distinct, non-blank addresses in sorted order.
fn distinct_addresses<'a>(addresses: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
    addresses
        .into_iter()
        .filter(|address| !address.trim().is_empty())
        .collect()
}
