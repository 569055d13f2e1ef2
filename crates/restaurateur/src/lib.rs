//! Star Burger restaurateur dashboard library.
//!
//! Serves the manager pages: pending orders with the restaurants able to
//! cook them (nearest first), the product availability grid, and the
//! restaurant roster. Exposed as a library so the CLI can reuse the
//! repositories and the coordinate cache.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod geocoder;
pub mod routes;
pub mod services;
pub mod state;
