//! Product availability grid.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::instrument;

use star_burger_core::{AvailabilityMatrix, ProductAvailability};

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityCell {
    pub available: bool,
}

/// One row of the grid: a product and a cell per restaurant column.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub name: String,
    pub price: String,
    pub special: bool,
    pub cells: Vec<AvailabilityCell>,
}

impl From<&ProductAvailability<'_>> for ProductRowView {
    fn from(row: &ProductAvailability<'_>) -> Self {
        Self {
            name: row.product.name.clone(),
            price: row.product.price.to_string(),
            special: row.product.special_status,
            cells: row
                .availability
                .iter()
                .map(|&available| AvailabilityCell { available })
                .collect(),
        }
    }
}

/// Products page template.
#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub current_path: &'static str,
    pub restaurants: Vec<String>,
    pub rows: Vec<ProductRowView>,
}

impl ProductsTemplate {
    fn from_matrix(matrix: &AvailabilityMatrix<'_>) -> Self {
        Self {
            current_path: "/manager/products/",
            restaurants: matrix.restaurants.iter().map(|r| r.name.clone()).collect(),
            rows: matrix.rows.iter().map(ProductRowView::from).collect(),
        }
    }
}

/// Which restaurant sells which product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();
    let (products, restaurants, menu_items) = tokio::try_join!(
        db::products::all(pool),
        db::restaurants::all_by_name(pool),
        db::menu::all(pool),
    )?;

    let matrix = AvailabilityMatrix::build(&products, &restaurants, &menu_items);
    let template = ProductsTemplate::from_matrix(&matrix);

    let html = template.render()?;
    Ok(Html(html))
}
