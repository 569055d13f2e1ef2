//! Pending order route handlers.
//!
//! Every render loads a fresh snapshot (pending orders, restaurant roster,
//! menu items, cached coordinates) and runs the availability resolver over
//! it. Nothing here calls the geocoder.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::instrument;

use star_burger_core::{
    Order, OrderId, OrderRanking, PaymentMethod, RankingOutcome, Restaurant, RestaurantId,
    RestaurantAvailabilityResolver,
};

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// One row of the orders table.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: OrderId,
    pub status: &'static str,
    pub payment: &'static str,
    pub total: String,
    pub customer: String,
    pub phonenumber: String,
    pub address: String,
    pub comment: String,
    /// Restaurant already cooking the order.
    pub assigned: Option<String>,
    /// Capable restaurants, nearest first, as "Name - 1.23 km".
    pub candidates: Vec<String>,
    /// Why `candidates` is empty, when it is.
    pub notice: Option<&'static str>,
}

impl OrderView {
    fn new(
        order: &Order,
        ranking: Option<&OrderRanking>,
        names: &HashMap<RestaurantId, &str>,
    ) -> Self {
        let assigned = order
            .restaurant
            .map(|id| names.get(&id).map_or_else(|| format!("#{id}"), |n| (*n).to_string()));

        let candidates: Vec<String> = ranking
            .map(|r| r.restaurants.iter().map(ToString::to_string).collect())
            .unwrap_or_default();

        let notice = match ranking.map(|r| r.outcome) {
            Some(RankingOutcome::AddressNotLocated) => Some("Address not located"),
            Some(RankingOutcome::NoLineItems) => Some("Order has no items"),
            Some(RankingOutcome::Ranked) if candidates.is_empty() => {
                Some("No restaurant can cook the whole order")
            }
            _ => None,
        };

        Self {
            id: order.id,
            status: order.status.label(),
            payment: order.payment.map_or("Not selected", PaymentMethod::label),
            total: order.total().to_string(),
            customer: order.customer_name(),
            phonenumber: order.phonenumber.clone(),
            address: order.address.clone(),
            comment: order.comment.clone(),
            assigned,
            candidates,
            notice,
        }
    }
}

/// Pending orders page template.
#[derive(Template)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub current_path: &'static str,
    pub orders: Vec<OrderView>,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything one render needs, already resolved.
struct Snapshot {
    orders: Vec<Order>,
    restaurants: Vec<Restaurant>,
    rankings: Vec<OrderRanking>,
}

async fn load_snapshot(state: &AppState) -> Result<Snapshot, AppError> {
    let pool = state.pool();
    let (orders, restaurants, menu_items) = tokio::try_join!(
        db::orders::pending(pool),
        db::restaurants::all(pool),
        db::menu::all(pool),
    )?;

    let addresses: Vec<&str> = orders.iter().map(|order| order.address.as_str()).collect();
    let coordinates = state.coordinates().lookup_many(addresses).await?;

    let rankings = RestaurantAvailabilityResolver::new(&restaurants, &menu_items)
        .resolve_pending(&orders, &coordinates);

    tracing::debug!(
        orders = orders.len(),
        restaurants = restaurants.len(),
        located = coordinates.len(),
        "Resolved pending orders"
    );

    Ok(Snapshot {
        orders,
        restaurants,
        rankings,
    })
}

fn order_views(snapshot: &Snapshot) -> Vec<OrderView> {
    let names: HashMap<RestaurantId, &str> = snapshot
        .restaurants
        .iter()
        .map(|r| (r.id, r.name.as_str()))
        .collect();
    let rankings: HashMap<OrderId, &OrderRanking> =
        snapshot.rankings.iter().map(|r| (r.order_id, r)).collect();

    snapshot
        .orders
        .iter()
        .map(|order| OrderView::new(order, rankings.get(&order.id).copied(), &names))
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Pending orders with the restaurants able to cook each one.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let snapshot = load_snapshot(&state).await?;

    let template = OrdersTemplate {
        current_path: "/manager/orders/",
        orders: order_views(&snapshot),
    };

    let html = template.render()?;
    Ok(Html(html))
}

/// Ranked restaurants for every pending order, as JSON.
#[instrument(skip(state))]
pub async fn rankings(State(state): State<AppState>) -> Result<Json<Vec<OrderRanking>>, AppError> {
    let snapshot = load_snapshot(&state).await?;
    Ok(Json(snapshot.rankings))
}
