//! Geocoder cache table.
//!
//! One row per distinct free-text address. A row whose coordinate columns
//! are null records that the address was looked up but not found (or that
//! the lookup failed); `requested_at` tells when that happened.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use star_burger_core::{AddressCoordinate, Coordinate};

use super::{RepositoryError, coordinate_columns, coordinate_from_columns};

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    requested_at: DateTime<Utc>,
}

impl TryFrom<AddressRow> for AddressCoordinate {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let coordinate =
            coordinate_from_columns("address", &row.address, row.latitude, row.longitude)?;
        Ok(Self {
            address: row.address,
            coordinate,
            requested_at: row.requested_at,
        })
    }
}

/// Cached entries for the given addresses. Unknown addresses are omitted.
///
/// # Errors
///
/// Returns an error if the query fails or a row holds an invalid coordinate.
#[instrument(skip(pool, addresses), fields(count = addresses.len()))]
pub async fn find_many(
    pool: &PgPool,
    addresses: &[String],
) -> Result<Vec<AddressCoordinate>, RepositoryError> {
    if addresses.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, AddressRow>(
        r"
        SELECT address, latitude, longitude, requested_at
        FROM addresses
        WHERE address = ANY($1)
        ",
    )
    .bind(addresses)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(AddressCoordinate::try_from)
    .collect()
}

/// Fetch the cache row for `address`, inserting an empty one if needed.
///
/// Returns the entry and whether it was just created.
///
/// # Errors
///
/// Returns an error if the query fails or the row holds an invalid coordinate.
#[instrument(skip(pool))]
pub async fn get_or_create(
    pool: &PgPool,
    address: &str,
) -> Result<(AddressCoordinate, bool), RepositoryError> {
    let inserted = sqlx::query_as::<_, AddressRow>(
        r"
        INSERT INTO addresses (address)
        VALUES ($1)
        ON CONFLICT (address) DO NOTHING
        RETURNING address, latitude, longitude, requested_at
        ",
    )
    .bind(address)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok((AddressCoordinate::try_from(row)?, true));
    }

    let row = sqlx::query_as::<_, AddressRow>(
        "SELECT address, latitude, longitude, requested_at FROM addresses WHERE address = $1",
    )
    .bind(address)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok((AddressCoordinate::try_from(row)?, false))
}

/// Record the outcome of a geocoder lookup for `address`.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the address has no cache row.
#[instrument(skip(pool))]
pub async fn set_coordinate(
    pool: &PgPool,
    address: &str,
    coordinate: Option<Coordinate>,
) -> Result<AddressCoordinate, RepositoryError> {
    let (latitude, longitude) = coordinate_columns(coordinate);
    let row = sqlx::query_as::<_, AddressRow>(
        r"
        UPDATE addresses
        SET latitude = $2, longitude = $3, requested_at = NOW()
        WHERE address = $1
        RETURNING address, latitude, longitude, requested_at
        ",
    )
    .bind(address)
    .bind(latitude)
    .bind(longitude)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    AddressCoordinate::try_from(row)
}
