//! Yandex geocoder HTTP client.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};
use url::Url;

use star_burger_core::Coordinate;

use super::error::GeocoderError;
use super::types::GeocodeResponse;
use crate::config::GeocoderConfig;

/// Client for the Yandex geocoder.
#[derive(Clone)]
pub struct GeocoderClient {
    /// HTTP client.
    client: Client,
    /// Endpoint, without query parameters.
    base_url: Url,
    /// API key, sent as the `apikey` query parameter.
    api_key: SecretString,
}

impl std::fmt::Debug for GeocoderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GeocoderClient {
    /// Create a new geocoder client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocoderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocoderError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Look up the most relevant coordinate for a free-text address.
    ///
    /// Returns `Ok(None)` when the geocoder knows nothing about the address.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the geocoder answers with a
    /// non-success status, or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn fetch_coordinates(
        &self,
        address: &str,
    ) -> Result<Option<Coordinate>, GeocoderError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("geocode", address)
            .append_pair("apikey", self.api_key.expose_secret())
            .append_pair("format", "json");

        let response = self
            .client
            .get(url)
            .send()
            .await
            // The URL carries the API key; keep it out of logs.
            .map_err(|e| GeocoderError::Request(e.without_url().to_string()))?;

        check_status(response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| GeocoderError::Request(e.without_url().to_string()))?;

        let coordinate = parse_response(&body)?;
        debug!(found = coordinate.is_some(), "Geocoder lookup finished");
        Ok(coordinate)
    }
}

/// Reject non-success answers, such as 403 for a revoked key.
///
/// # Errors
///
/// Returns [`GeocoderError::Status`] carrying the status code.
fn check_status(status: StatusCode) -> Result<(), GeocoderError> {
    if status.is_success() {
        return Ok(());
    }
    warn!(status = status.as_u16(), "Geocoder returned an error status");
    Err(GeocoderError::Status(status.as_u16()))
}

/// Extract the most relevant point from a geocoder response body.
///
/// # Errors
///
/// Returns [`GeocoderError::Malformed`] if the body is not a geocoder
/// response or the point cannot be parsed.
pub fn parse_response(body: &str) -> Result<Option<Coordinate>, GeocoderError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| GeocoderError::Malformed(e.to_string()))?;

    response
        .response
        .collection
        .feature_members
        .first()
        .map(|member| parse_position(&member.geo_object.point.pos))
        .transpose()
}

/// Parse a `"<longitude> <latitude>"` position string.
///
/// # Errors
///
/// Returns [`GeocoderError::Malformed`] if the string does not hold exactly
/// two numbers forming a valid coordinate.
pub fn parse_position(pos: &str) -> Result<Coordinate, GeocoderError> {
    let mut parts = pos.split_whitespace();
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeocoderError::Malformed(format!(
            "expected '<lon> <lat>', got '{pos}'"
        )));
    };

    let parse = |raw: &str| {
        raw.parse::<f64>()
            .map_err(|e| GeocoderError::Malformed(format!("bad number '{raw}': {e}")))
    };
    let (longitude, latitude) = (parse(lon)?, parse(lat)?);

    Coordinate::new(latitude, longitude).map_err(|e| GeocoderError::Malformed(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RED_SQUARE: &str = r#"{
        "response": {
            "GeoObjectCollection": {
                "metaDataProperty": {
                    "GeocoderResponseMetaData": {"request": "Red Square", "found": "2", "results": "10"}
                },
                "featureMember": [
                    {"GeoObject": {"name": "Red Square", "Point": {"pos": "37.621093 55.753605"}}},
                    {"GeoObject": {"name": "Red Square metro", "Point": {"pos": "37.6 55.7"}}}
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_position_is_lon_then_lat() {
        let c = parse_position("37.621093 55.753605").unwrap();
        assert!((c.latitude() - 55.753_605).abs() < 1e-9);
        assert!((c.longitude() - 37.621_093).abs() < 1e-9);
    }

    #[test]
    fn test_parse_position_rejects_garbage() {
        assert!(parse_position("").is_err());
        assert!(parse_position("37.6").is_err());
        assert!(parse_position("37.6 55.7 1.0").is_err());
        assert!(parse_position("east north").is_err());
        // Swapped order puts latitude out of range.
        assert!(parse_position("10.0 137.6").is_err());
    }

    #[test]
    fn test_parse_response_takes_first_member() {
        let c = parse_response(RED_SQUARE).unwrap().unwrap();
        assert!((c.latitude() - 55.753_605).abs() < 1e-9);
    }

    #[test]
    fn test_parse_response_without_members_is_none() {
        let body = r#"{"response": {"GeoObjectCollection": {"featureMember": []}}}"#;
        assert!(parse_response(body).unwrap().is_none());
    }

    #[test]
    fn test_parse_response_rejects_other_json() {
        let err = parse_response(r#"{"error": "Invalid key"}"#).unwrap_err();
        assert!(matches!(err, GeocoderError::Malformed(_)));
    }

    #[test]
    fn test_check_status_rejects_error_answers() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN),
            Err(GeocoderError::Status(403))
        ));
        assert!(matches!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(GeocoderError::Status(500))
        ));
    }
}
