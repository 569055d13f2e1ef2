//! Restaurant roster queries.

use sqlx::PgPool;
use tracing::instrument;

use star_burger_core::{Coordinate, Restaurant, RestaurantId};

use super::{RepositoryError, coordinate_columns, coordinate_from_columns};

const SELECT_RESTAURANTS: &str = r"
    SELECT id, name, address, contact_phone, latitude, longitude
    FROM restaurants
";

#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: RestaurantId,
    name: String,
    address: String,
    contact_phone: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = RepositoryError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        let coordinate = coordinate_from_columns("restaurant", row.id, row.latitude, row.longitude)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            contact_phone: row.contact_phone,
            coordinate,
        })
    }
}

async fn fetch(pool: &PgPool, sql: &str) -> Result<Vec<Restaurant>, RepositoryError> {
    sqlx::query_as::<_, RestaurantRow>(sql)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Restaurant::try_from)
        .collect()
}

/// All restaurants in creation order. This is the resolver's roster order.
///
/// # Errors
///
/// Returns an error if the query fails or a row holds an invalid coordinate.
#[instrument(skip(pool))]
pub async fn all(pool: &PgPool) -> Result<Vec<Restaurant>, RepositoryError> {
    fetch(pool, &format!("{SELECT_RESTAURANTS} ORDER BY id")).await
}

/// All restaurants sorted by name, for the products grid columns.
///
/// # Errors
///
/// Returns an error if the query fails or a row holds an invalid coordinate.
#[instrument(skip(pool))]
pub async fn all_by_name(pool: &PgPool) -> Result<Vec<Restaurant>, RepositoryError> {
    fetch(pool, &format!("{SELECT_RESTAURANTS} ORDER BY name, id")).await
}

/// Restaurants whose address has never been located.
///
/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip(pool))]
pub async fn missing_coordinates(pool: &PgPool) -> Result<Vec<Restaurant>, RepositoryError> {
    fetch(
        pool,
        &format!("{SELECT_RESTAURANTS} WHERE latitude IS NULL OR longitude IS NULL ORDER BY id"),
    )
    .await
}

/// Store a restaurant's geocoded location. `None` clears it.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] if the restaurant does not exist.
#[instrument(skip(pool))]
pub async fn set_coordinate(
    pool: &PgPool,
    id: RestaurantId,
    coordinate: Option<Coordinate>,
) -> Result<(), RepositoryError> {
    let (latitude, longitude) = coordinate_columns(coordinate);
    let result = sqlx::query("UPDATE restaurants SET latitude = $2, longitude = $3 WHERE id = $1")
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
