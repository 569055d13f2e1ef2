//! Business logic services for the restaurateur dashboard.
//!
//! # Services
//!
//! - `coordinates` - Address coordinate cache in front of the geocoder

pub mod coordinates;

pub use coordinates::CoordinateCache;
