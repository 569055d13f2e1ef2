//! Ranking capable restaurants for pending orders.
//!
//! For every active order the resolver intersects the restaurants that sell
//! each of its products, drops those without a known location, and sorts
//! the rest by geodesic distance from the delivery address.
//!
//! The resolver only reads what it is given. Address coordinates come from
//! a [`CoordinateLookup`], which the dashboard fills from the coordinate
//! cache before rendering, so ranking never waits on the geocoder.
//!
//! ```
//! use std::collections::HashMap;
//! use star_burger_core::{Coordinate, RestaurantAvailabilityResolver};
//!
//! let coordinates: HashMap<String, Coordinate> = HashMap::new();
//! let resolver = RestaurantAvailabilityResolver::new(&[], &[]);
//! assert!(resolver.resolve_pending(&[], &coordinates).is_empty());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::availability::AvailabilityIndex;
use crate::geo::distance_km;
use crate::models::{MenuItem, Order, Restaurant};
use crate::types::{Coordinate, OrderId, RestaurantId};

/// Address → coordinate lookup backed by the coordinate cache.
pub trait CoordinateLookup {
    /// Coordinate of `address`, or `None` if it was never located.
    fn coordinate_of(&self, address: &str) -> Option<Coordinate>;
}

impl<S: std::hash::BuildHasher> CoordinateLookup for HashMap<String, Coordinate, S> {
    fn coordinate_of(&self, address: &str) -> Option<Coordinate> {
        self.get(address).copied()
    }
}

impl CoordinateLookup for BTreeMap<String, Coordinate> {
    fn coordinate_of(&self, address: &str) -> Option<Coordinate> {
        self.get(address).copied()
    }
}

/// A capable restaurant and how far it is from the delivery address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRestaurant {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub distance_km: f64,
}

impl RankedRestaurant {
    /// Distance rounded to two decimals for display.
    #[must_use]
    pub fn rounded_km(&self) -> f64 {
        (self.distance_km * 100.0).round() / 100.0
    }
}

impl fmt::Display for RankedRestaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {:.2} km", self.name, self.distance_km)
    }
}

/// Why an order's restaurant list looks the way it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingOutcome {
    /// Capable restaurants were ranked. The list may still be empty.
    Ranked,
    /// The delivery address has no known coordinate.
    AddressNotLocated,
    /// The order has no lines, so no restaurant is capable.
    NoLineItems,
}

/// Ranked restaurants for one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRanking {
    pub order_id: OrderId,
    pub outcome: RankingOutcome,
    /// Nearest first.
    pub restaurants: Vec<RankedRestaurant>,
}

impl OrderRanking {
    const fn empty(order_id: OrderId, outcome: RankingOutcome) -> Self {
        Self {
            order_id,
            outcome,
            restaurants: Vec::new(),
        }
    }
}

/// Ranks capable restaurants for orders.
///
/// Holds the availability index for one resolution pass.
#[derive(Debug, Clone)]
pub struct RestaurantAvailabilityResolver<'a> {
    restaurants: &'a [Restaurant],
    index: AvailabilityIndex,
}

impl<'a> RestaurantAvailabilityResolver<'a> {
    /// Prepare a pass over `restaurants`, indexing `menu_items` once.
    #[must_use]
    pub fn new(restaurants: &'a [Restaurant], menu_items: &[MenuItem]) -> Self {
        Self {
            restaurants,
            index: AvailabilityIndex::build(menu_items),
        }
    }

    /// Rank every non-terminal order, preserving input order.
    #[must_use]
    pub fn resolve_pending(
        &self,
        orders: &[Order],
        coordinates: &impl CoordinateLookup,
    ) -> Vec<OrderRanking> {
        orders
            .iter()
            .filter(|order| !order.status.is_terminal())
            .map(|order| self.resolve(order, coordinates.coordinate_of(&order.address)))
            .collect()
    }

    /// Rank capable restaurants for a single order located at `origin`.
    #[must_use]
    pub fn resolve(&self, order: &Order, origin: Option<Coordinate>) -> OrderRanking {
        let products = order.product_ids();
        if products.is_empty() {
            return OrderRanking::empty(order.id, RankingOutcome::NoLineItems);
        }
        let Some(origin) = origin else {
            return OrderRanking::empty(order.id, RankingOutcome::AddressNotLocated);
        };

        let capable = self.index.capable_restaurants(&products);

        let mut restaurants: Vec<RankedRestaurant> = self
            .restaurants
            .iter()
            .filter(|restaurant| capable.contains(&restaurant.id))
            .filter_map(|restaurant| {
                let location = restaurant.coordinate?;
                Some(RankedRestaurant {
                    restaurant_id: restaurant.id,
                    name: restaurant.name.clone(),
                    distance_km: distance_km(origin, location),
                })
            })
            .collect();
        // Stable: equal distances keep roster order.
        restaurants.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        OrderRanking {
            order_id: order.id,
            outcome: RankingOutcome::Ranked,
            restaurants,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::fixtures::{menu_item, order, restaurant};
    use crate::types::OrderStatus;

    /// Kilometres per degree of longitude on the equator.
    const KM_PER_DEGREE: f64 = 111.319_490_793;

    const ORDER_ADDRESS: &str = "Tverskaya 1";

    /// A point on the equator `km` east of the order address.
    fn east_of_origin(km: f64) -> Option<Coordinate> {
        Some(Coordinate::new(0.0, km / KM_PER_DEGREE).unwrap())
    }

    fn origin_lookup() -> HashMap<String, Coordinate> {
        HashMap::from([(ORDER_ADDRESS.to_string(), Coordinate::new(0.0, 0.0).unwrap())])
    }

    fn names(ranking: &OrderRanking) -> Vec<&str> {
        ranking.restaurants.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_only_restaurants_selling_every_product() {
        let roster = [
            restaurant(1, "X", east_of_origin(3.2)),
            restaurant(2, "Y", east_of_origin(1.0)),
        ];
        let items = [
            menu_item(1, 1, 1, true),
            menu_item(2, 1, 2, true),
            menu_item(3, 2, 1, true),
        ];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let rankings = resolver.resolve_pending(&[order(1, ORDER_ADDRESS, &[1, 2])], &origin_lookup());

        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].outcome, RankingOutcome::Ranked);
        assert_eq!(names(&rankings[0]), vec!["X"]);
        assert!((rankings[0].restaurants[0].rounded_km() - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_unsold_product_yields_empty_list() {
        let roster = [restaurant(1, "X", east_of_origin(1.0))];
        let items = [menu_item(1, 1, 1, false)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let rankings = resolver.resolve_pending(&[order(1, ORDER_ADDRESS, &[1])], &origin_lookup());

        assert_eq!(rankings[0].outcome, RankingOutcome::Ranked);
        assert!(rankings[0].restaurants.is_empty());
    }

    #[test]
    fn test_unlocated_address_yields_empty_list() {
        let roster = [restaurant(1, "X", east_of_origin(1.0))];
        let items = [menu_item(1, 1, 1, true)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let rankings = resolver.resolve_pending(
            &[order(1, "Nowhere lane 13", &[1])],
            &origin_lookup(),
        );

        assert_eq!(rankings[0].outcome, RankingOutcome::AddressNotLocated);
        assert!(rankings[0].restaurants.is_empty());
    }

    #[test]
    fn test_sorted_nearest_first() {
        let roster = [
            restaurant(1, "X", east_of_origin(5.0)),
            restaurant(2, "Y", east_of_origin(2.0)),
        ];
        let items = [menu_item(1, 1, 1, true), menu_item(2, 2, 1, true)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let ranking = resolver.resolve(&order(1, ORDER_ADDRESS, &[1]), Coordinate::new(0.0, 0.0).ok());

        assert_eq!(names(&ranking), vec!["Y", "X"]);
        assert!((ranking.restaurants[0].rounded_km() - 2.0).abs() < 1e-9);
        assert!((ranking.restaurants[1].rounded_km() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_capable_restaurant_without_coordinate_is_excluded() {
        let roster = [
            restaurant(1, "X", None),
            restaurant(2, "Y", east_of_origin(2.0)),
        ];
        let items = [menu_item(1, 1, 1, true), menu_item(2, 2, 1, true)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let ranking = resolver.resolve(&order(1, ORDER_ADDRESS, &[1]), Coordinate::new(0.0, 0.0).ok());

        assert_eq!(names(&ranking), vec!["Y"]);
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let roster = [
            restaurant(3, "C", east_of_origin(4.0)),
            restaurant(1, "A", east_of_origin(4.0)),
            restaurant(2, "B", east_of_origin(1.0)),
        ];
        let items = [
            menu_item(1, 1, 1, true),
            menu_item(2, 2, 1, true),
            menu_item(3, 3, 1, true),
        ];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let ranking = resolver.resolve(&order(1, ORDER_ADDRESS, &[1]), Coordinate::new(0.0, 0.0).ok());

        assert_eq!(names(&ranking), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_order_without_lines_is_not_an_error() {
        let roster = [restaurant(1, "X", east_of_origin(1.0))];
        let items = [menu_item(1, 1, 1, true)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let ranking = resolver.resolve(&order(1, ORDER_ADDRESS, &[]), Coordinate::new(0.0, 0.0).ok());

        assert_eq!(ranking.outcome, RankingOutcome::NoLineItems);
        assert!(ranking.restaurants.is_empty());
    }

    #[test]
    fn test_completed_orders_are_skipped_and_order_is_preserved() {
        let roster = [restaurant(1, "X", east_of_origin(1.0))];
        let items = [menu_item(1, 1, 1, true)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let mut delivered = order(2, ORDER_ADDRESS, &[1]);
        delivered.status = OrderStatus::Completed;
        let orders = [order(3, ORDER_ADDRESS, &[1]), delivered, order(1, ORDER_ADDRESS, &[1])];

        let ids: Vec<i32> = resolver
            .resolve_pending(&orders, &origin_lookup())
            .iter()
            .map(|r| r.order_id.as_i32())
            .collect();

        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_one_bad_order_does_not_affect_others() {
        let roster = [restaurant(1, "X", east_of_origin(1.0))];
        let items = [menu_item(1, 1, 1, true)];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);
        let orders = [
            order(1, "Unknown street", &[1]),
            order(2, ORDER_ADDRESS, &[]),
            order(3, ORDER_ADDRESS, &[1]),
        ];

        let rankings = resolver.resolve_pending(&orders, &origin_lookup());

        assert_eq!(rankings[0].outcome, RankingOutcome::AddressNotLocated);
        assert_eq!(rankings[1].outcome, RankingOutcome::NoLineItems);
        assert_eq!(names(&rankings[2]), vec!["X"]);
    }

    #[test]
    fn test_resolving_twice_is_identical() {
        let roster = [
            restaurant(1, "X", east_of_origin(5.0)),
            restaurant(2, "Y", east_of_origin(2.0)),
            restaurant(3, "Z", None),
        ];
        let items = [
            menu_item(1, 1, 1, true),
            menu_item(2, 2, 1, true),
            menu_item(3, 3, 1, true),
        ];
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);
        let orders = [order(1, ORDER_ADDRESS, &[1]), order(2, ORDER_ADDRESS, &[1])];

        let first = resolver.resolve_pending(&orders, &origin_lookup());
        let second = resolver.resolve_pending(&orders, &origin_lookup());

        assert_eq!(first, second);
    }

    #[test]
    fn test_every_ranked_restaurant_is_capable_and_listed_once() {
        let roster: Vec<_> = (1..=6)
            .map(|id| restaurant(id, &format!("R{id}"), east_of_origin(f64::from(7 - id))))
            .collect();
        // Restaurant n sells products 1..=n, and product 3 is switched off at 5.
        let mut items = Vec::new();
        let mut next_id = 1;
        for r in 1..=6 {
            for p in 1..=r {
                items.push(menu_item(next_id, r, p, !(r == 5 && p == 3)));
                next_id += 1;
            }
        }
        let resolver = RestaurantAvailabilityResolver::new(&roster, &items);

        let ranking = resolver.resolve(&order(1, ORDER_ADDRESS, &[1, 3]), Coordinate::new(0.0, 0.0).ok());

        let ids: Vec<i32> = ranking
            .restaurants
            .iter()
            .map(|r| r.restaurant_id.as_i32())
            .collect();
        assert_eq!(ids, vec![6, 4, 3]);
        assert!(
            ranking
                .restaurants
                .windows(2)
                .all(|pair| pair[0].distance_km <= pair[1].distance_km)
        );
    }

    #[test]
    fn test_display_format() {
        let ranked = RankedRestaurant {
            restaurant_id: RestaurantId::new(1),
            name: "Star Burger Arbat".to_string(),
            distance_km: 3.14159,
        };
        assert_eq!(ranked.to_string(), "Star Burger Arbat - 3.14 km");
        assert!((ranked.rounded_km() - 3.14).abs() < 1e-9);
    }
}
