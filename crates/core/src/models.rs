//! Domain models shared by the dashboard, the CLI, and the resolver.
//!
//! These are plain data: repositories in the restaurateur crate convert
//! their row types into them, and nothing here performs I/O.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, Coordinate, MenuItemId, OrderId, OrderLineId, OrderStatus, PaymentMethod, Price,
    ProductId, RestaurantId,
};

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<CategoryId>,
    /// Current list price. Order lines keep their own captured price.
    pub price: Price,
    /// Shown as a special offer on the storefront.
    pub special_status: bool,
    pub description: String,
}

/// A restaurant that can cook orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    pub contact_phone: String,
    /// `None` when geocoding the address failed.
    pub coordinate: Option<Coordinate>,
}

/// Whether a restaurant currently sells a product.
///
/// The database holds at most one menu item per `(restaurant, product)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub product_id: ProductId,
    pub availability: bool,
}

/// One product line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ProductId,
    /// Always at least one.
    pub quantity: u32,
    /// Unit price captured at checkout.
    pub price: Price,
}

impl OrderLine {
    /// Captured unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A customer order with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Free-text delivery address, also the key into the coordinate cache.
    pub address: String,
    pub firstname: String,
    pub lastname: String,
    pub phonenumber: String,
    pub status: OrderStatus,
    pub payment: Option<PaymentMethod>,
    pub comment: String,
    pub registered_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    /// Restaurant a manager already assigned the order to.
    pub restaurant: Option<RestaurantId>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Order total from the captured line prices.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    /// Distinct products referenced by the order's lines.
    #[must_use]
    pub fn product_ids(&self) -> BTreeSet<ProductId> {
        self.lines.iter().map(|line| line.product_id).collect()
    }

    /// Customer name as shown on the dashboard.
    #[must_use]
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// A cached geocoding result for a free-text address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCoordinate {
    pub address: String,
    /// `None` when the geocoder failed or found nothing.
    pub coordinate: Option<Coordinate>,
    /// When the geocoder was last asked about this address.
    pub requested_at: DateTime<Utc>,
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::fixtures::order;
    use super::*;

    #[test]
    fn test_total_uses_captured_prices() {
        let mut o = order(1, "Tverskaya 1", &[1, 2]);
        o.lines[0].quantity = 3;
        o.lines[1].price = Price::new(Decimal::new(9999, 2));
        // 3 * 250 + 1 * 99.99
        assert_eq!(o.total(), Price::new(Decimal::new(84999, 2)));
    }

    #[test]
    fn test_product_ids_are_distinct() {
        let o = order(1, "Tverskaya 1", &[3, 1, 3, 2]);
        let ids: Vec<_> = o.product_ids().into_iter().map(i32::from).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_customer_name() {
        assert_eq!(order(1, "x", &[1]).customer_name(), "Ivan Petrov");
    }
}
