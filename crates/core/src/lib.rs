//! Star Burger Core - shared types and restaurant availability logic.
//!
//! This crate provides what every Star Burger component agrees on:
//! - `restaurateur` - Manager dashboard for pending orders, menus, and restaurants
//! - `cli` - Command-line tools for migrations and geocoding backfills
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Repositories convert their rows into
//! [`models`], and the dashboard hands those to the [`resolver`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, coordinates, and statuses
//! - [`models`] - Orders, products, restaurants, and menu items
//! - [`availability`] - Product-to-restaurant availability index and grid
//! - [`geo`] - Geodesic distance on the WGS-84 ellipsoid
//! - [`resolver`] - Ranking capable restaurants for pending orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod geo;
pub mod models;
pub mod resolver;
pub mod types;

pub use availability::{AvailabilityIndex, AvailabilityMatrix, ProductAvailability};
pub use models::{AddressCoordinate, MenuItem, Order, OrderLine, Product, Restaurant};
pub use resolver::{
    CoordinateLookup, OrderRanking, RankedRestaurant, RankingOutcome,
    RestaurantAvailabilityResolver,
};
pub use types::*;
