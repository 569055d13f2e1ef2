//! Yandex geocoder integration.
//!
//! Turns free-text addresses into coordinates. Only the coordinate cache
//! calls this; dashboard pages read cached coordinates and never wait on
//! the network.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeocoderClient, parse_position, parse_response};
pub use error::GeocoderError;
