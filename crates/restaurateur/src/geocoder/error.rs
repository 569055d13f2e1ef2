//! Geocoder errors.

use thiserror::Error;

/// Errors that can occur when asking the geocoder for a coordinate.
///
/// Callers never let these reach the dashboard: a failed lookup is stored
/// as a missing coordinate.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// HTTP request failed before a response arrived.
    #[error("geocoder request failed: {0}")]
    Request(String),

    /// The geocoder answered with a non-success status.
    #[error("geocoder returned HTTP {0}")]
    Status(u16),

    /// The response body was not in the expected shape.
    #[error("malformed geocoder response: {0}")]
    Malformed(String),

    /// HTTP client could not be constructed.
    #[error("geocoder configuration error: {0}")]
    Config(String),
}
