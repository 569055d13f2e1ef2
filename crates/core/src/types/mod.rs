//! Core types for Star Burger.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coordinate;
pub mod id;
pub mod price;
pub mod status;

pub use coordinate::{Coordinate, CoordinateError};
pub use id::*;
pub use price::Price;
pub use status::*;
