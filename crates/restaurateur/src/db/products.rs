//! Product catalog queries.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use star_burger_core::{CategoryId, Price, Product, ProductId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category_id: Option<CategoryId>,
    price: Decimal,
    special_status: bool,
    description: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category_id,
            price: Price::new(row.price),
            special_status: row.special_status,
            description: row.description,
        }
    }
}

/// All products in creation order.
///
/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip(pool))]
pub async fn all(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        r"
        SELECT id, name, category_id, price, special_status, description
        FROM products
        ORDER BY id
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}
