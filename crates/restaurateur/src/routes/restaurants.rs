//! Restaurant roster.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::instrument;

use star_burger_core::Restaurant;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// One roster row.
#[derive(Debug, Clone)]
pub struct RestaurantView {
    pub name: String,
    pub address: String,
    pub contact_phone: String,
    /// "lat, lon", or `None` if the address was never located.
    pub location: Option<String>,
}

impl From<&Restaurant> for RestaurantView {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            address: restaurant.address.clone(),
            contact_phone: restaurant.contact_phone.clone(),
            location: restaurant.coordinate.map(|c| c.to_string()),
        }
    }
}

/// Restaurants page template.
#[derive(Template)]
#[template(path = "restaurants.html")]
pub struct RestaurantsTemplate {
    pub current_path: &'static str,
    pub restaurants: Vec<RestaurantView>,
}

/// All restaurants with their geocoded location.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let restaurants = db::restaurants::all_by_name(state.pool()).await?;

    let template = RestaurantsTemplate {
        current_path: "/manager/restaurants/",
        restaurants: restaurants.iter().map(RestaurantView::from).collect(),
    };

    let html = template.render()?;
    Ok(Html(html))
}
