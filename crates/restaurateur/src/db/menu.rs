//! Menu item queries.

use sqlx::PgPool;
use tracing::instrument;

use star_burger_core::{MenuItem, MenuItemId, ProductId, RestaurantId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: MenuItemId,
    restaurant_id: RestaurantId,
    product_id: ProductId,
    availability: bool,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            product_id: row.product_id,
            availability: row.availability,
        }
    }
}

/// Every menu item, available or not.
///
/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip(pool))]
pub async fn all(pool: &PgPool) -> Result<Vec<MenuItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, MenuItemRow>(
        "SELECT id, restaurant_id, product_id, availability FROM menu_items ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(MenuItem::from).collect())
}
