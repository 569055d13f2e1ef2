//! Order queries.
//!
//! Orders and their lines are read in two round trips and stitched together
//! in memory, keyed by order id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use star_burger_core::{
    Order, OrderId, OrderLine, OrderLineId, OrderStatus, PaymentMethod, Price, ProductId,
    RestaurantId,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    address: String,
    firstname: String,
    lastname: String,
    phonenumber: String,
    status: OrderStatus,
    payment: Option<PaymentMethod>,
    comment: String,
    registered_at: DateTime<Utc>,
    called_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    restaurant_id: Option<RestaurantId>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            address: self.address,
            firstname: self.firstname,
            lastname: self.lastname,
            phonenumber: self.phonenumber,
            status: self.status,
            payment: self.payment,
            comment: self.comment,
            registered_at: self.registered_at,
            called_at: self.called_at,
            delivered_at: self.delivered_at,
            restaurant: self.restaurant_id,
            lines,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: OrderLineId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "order line {}: invalid quantity {}",
                    row.id, row.quantity
                ))
            })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            quantity,
            price: Price::new(row.price),
        })
    }
}

/// All orders that still need handling, with their lines.
///
/// Completed orders are excluded. Results are ordered by status (created
/// first) and then by id.
///
/// # Errors
///
/// Returns an error if either query fails or a line is corrupt.
#[instrument(skip(pool))]
pub async fn pending(pool: &PgPool) -> Result<Vec<Order>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r"
        SELECT id, address, firstname, lastname, phonenumber, status, payment,
               comment, registered_at, called_at, delivered_at, restaurant_id
        FROM orders
        WHERE status <> 'completed'
        ORDER BY status, id
        ",
    )
    .fetch_all(pool)
    .await?;

    let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
    let mut lines = lines_for(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let order_lines = lines.remove(&row.id).unwrap_or_default();
            row.into_order(order_lines)
        })
        .collect())
}

/// Lines for the given orders, grouped by order id in line id order.
async fn lines_for(
    pool: &PgPool,
    order_ids: &[i32],
) -> Result<HashMap<OrderId, Vec<OrderLine>>, RepositoryError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, OrderLineRow>(
        r"
        SELECT id, order_id, product_id, quantity, price
        FROM order_lines
        WHERE order_id = ANY($1)
        ORDER BY order_id, id
        ",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
    for row in rows {
        let order_id = row.order_id;
        grouped
            .entry(order_id)
            .or_default()
            .push(OrderLine::try_from(row)?);
    }
    Ok(grouped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line_row(quantity: i32) -> OrderLineRow {
        OrderLineRow {
            id: OrderLineId::new(7),
            order_id: OrderId::new(1),
            product_id: ProductId::new(3),
            quantity,
            price: Decimal::new(35000, 2),
        }
    }

    #[test]
    fn test_line_row_converts() {
        let line = OrderLine::try_from(line_row(2)).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price, Price::new(Decimal::new(350, 0)));
    }

    #[test]
    fn test_zero_quantity_is_corruption() {
        assert!(matches!(
            OrderLine::try_from(line_row(0)),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(matches!(
            OrderLine::try_from(line_row(-4)),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
