//! Yandex geocoder response shapes.
//!
//! Only the fields needed to pull out the most relevant point are modelled;
//! everything else in the response is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub response: GeocodeBody,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeBody {
    #[serde(rename = "GeoObjectCollection")]
    pub collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
pub struct GeoObjectCollection {
    /// Matches, most relevant first.
    #[serde(rename = "featureMember", default)]
    pub feature_members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureMember {
    #[serde(rename = "GeoObject")]
    pub geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
pub struct GeoObject {
    #[serde(rename = "Point")]
    pub point: Point,
}

#[derive(Debug, Deserialize)]
pub struct Point {
    /// `"<longitude> <latitude>"`.
    pub pos: String,
}
