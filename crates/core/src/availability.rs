//! Which restaurants sell which products.
//!
//! [`AvailabilityIndex`] answers "who can cook this whole order" and is built
//! once per dashboard render. [`AvailabilityMatrix`] is the product-by-
//! restaurant grid shown on the products page.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::models::{MenuItem, Product, Restaurant};
use crate::types::{ProductId, RestaurantId};

/// Product → restaurants currently selling it.
///
/// Only menu items with `availability = true` are indexed.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    by_product: HashMap<ProductId, HashSet<RestaurantId>>,
}

impl AvailabilityIndex {
    /// Index the sellable menu items.
    pub fn build<'a>(menu_items: impl IntoIterator<Item = &'a MenuItem>) -> Self {
        let mut by_product: HashMap<ProductId, HashSet<RestaurantId>> = HashMap::new();
        for item in menu_items.into_iter().filter(|item| item.availability) {
            by_product
                .entry(item.product_id)
                .or_default()
                .insert(item.restaurant_id);
        }
        Self { by_product }
    }

    /// Restaurants selling `product`, or `None` if nobody does.
    #[must_use]
    pub fn restaurants_for(&self, product: ProductId) -> Option<&HashSet<RestaurantId>> {
        self.by_product.get(&product)
    }

    /// Whether at least one restaurant sells `product` right now.
    #[must_use]
    pub fn is_sold_anywhere(&self, product: ProductId) -> bool {
        self.by_product
            .get(&product)
            .is_some_and(|restaurants| !restaurants.is_empty())
    }

    /// Restaurants selling every product in `products`.
    ///
    /// An empty product set has no capable restaurants.
    #[must_use]
    pub fn capable_restaurants(&self, products: &BTreeSet<ProductId>) -> HashSet<RestaurantId> {
        let mut sets = products.iter().map(|product| self.restaurants_for(*product));

        let Some(first) = sets.next() else {
            return HashSet::new();
        };
        let Some(first) = first else {
            return HashSet::new();
        };

        let mut capable = first.clone();
        for set in sets {
            match set {
                Some(set) => capable.retain(|restaurant| set.contains(restaurant)),
                None => capable.clear(),
            }
            if capable.is_empty() {
                break;
            }
        }
        capable
    }
}

/// One product row of the availability grid.
#[derive(Debug, Clone, Serialize)]
pub struct ProductAvailability<'a> {
    pub product: &'a Product,
    /// One flag per roster restaurant, in roster order.
    pub availability: Vec<bool>,
}

/// Product-by-restaurant availability grid.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityMatrix<'a> {
    pub restaurants: &'a [Restaurant],
    pub rows: Vec<ProductAvailability<'a>>,
}

impl<'a> AvailabilityMatrix<'a> {
    /// Build the grid for `products` against `restaurants`.
    ///
    /// Column order follows `restaurants`. A pair with no menu item is
    /// shown as unavailable; a pair with one shows its stored flag.
    #[must_use]
    pub fn build(
        products: &'a [Product],
        restaurants: &'a [Restaurant],
        menu_items: &[MenuItem],
    ) -> Self {
        let flags: HashMap<(ProductId, RestaurantId), bool> = menu_items
            .iter()
            .map(|item| ((item.product_id, item.restaurant_id), item.availability))
            .collect();

        let rows = products
            .iter()
            .map(|product| ProductAvailability {
                product,
                availability: restaurants
                    .iter()
                    .map(|restaurant| {
                        flags
                            .get(&(product.id, restaurant.id))
                            .copied()
                            .unwrap_or(false)
                    })
                    .collect(),
            })
            .collect();

        Self { restaurants, rows }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::fixtures::{menu_item, restaurant};
    use crate::types::Price;

    fn products(ids: &[i32]) -> BTreeSet<ProductId> {
        ids.iter().copied().map(ProductId::new).collect()
    }

    fn ids(set: &HashSet<RestaurantId>) -> Vec<i32> {
        let mut ids: Vec<i32> = set.iter().copied().map(i32::from).collect();
        ids.sort_unstable();
        ids
    }

    fn product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: None,
            price: Price::new(Decimal::new(300, 0)),
            special_status: false,
            description: String::new(),
        }
    }

    #[test]
    fn test_index_skips_unavailable_items() {
        let items = [menu_item(1, 1, 10, true), menu_item(2, 2, 10, false)];
        let index = AvailabilityIndex::build(&items);
        assert_eq!(ids(index.restaurants_for(ProductId::new(10)).unwrap_or(&HashSet::new())), vec![1]);
        assert!(index.is_sold_anywhere(ProductId::new(10)));
        assert!(!index.is_sold_anywhere(ProductId::new(11)));
    }

    #[test]
    fn test_capable_restaurants_intersects_products() {
        let items = [
            menu_item(1, 1, 10, true),
            menu_item(2, 1, 20, true),
            menu_item(3, 2, 10, true),
            menu_item(4, 3, 10, true),
            menu_item(5, 3, 20, true),
        ];
        let index = AvailabilityIndex::build(&items);
        assert_eq!(ids(&index.capable_restaurants(&products(&[10, 20]))), vec![1, 3]);
        assert_eq!(ids(&index.capable_restaurants(&products(&[10]))), vec![1, 2, 3]);
    }

    #[test]
    fn test_unsold_product_empties_intersection() {
        let items = [menu_item(1, 1, 10, true), menu_item(2, 1, 20, false)];
        let index = AvailabilityIndex::build(&items);
        assert!(index.capable_restaurants(&products(&[10, 20])).is_empty());
        assert!(index.capable_restaurants(&products(&[30, 10])).is_empty());
    }

    #[test]
    fn test_empty_product_set_has_no_capable_restaurants() {
        let items = [menu_item(1, 1, 10, true)];
        let index = AvailabilityIndex::build(&items);
        assert!(index.capable_restaurants(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_matrix_follows_roster_order_and_defaults_to_false() {
        let roster = [restaurant(2, "Anchor", None), restaurant(1, "Burger Bay", None)];
        let catalog = [product(10, "Cheeseburger"), product(20, "Fries")];
        let items = [
            menu_item(1, 1, 10, true),
            menu_item(2, 2, 10, false),
            menu_item(3, 2, 20, true),
        ];

        let matrix = AvailabilityMatrix::build(&catalog, &roster, &items);

        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].product.name, "Cheeseburger");
        assert_eq!(matrix.rows[0].availability, vec![false, true]);
        assert_eq!(matrix.rows[1].availability, vec![true, false]);
    }
}
