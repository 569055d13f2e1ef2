//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Variants are declared in workflow order, so sorting by status puts fresh
/// orders first. The Postgres enum `order_status` uses the same order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the customer, not yet processed by a manager.
    #[default]
    Created,
    /// Handed to a restaurant kitchen.
    Cooking,
    /// With a courier.
    Delivering,
    /// Delivered. Terminal.
    Completed,
}

impl OrderStatus {
    /// Whether the order has left the dashboard for good.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Human-readable label for the dashboard.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Unprocessed",
            Self::Cooking => "Cooking",
            Self::Delivering => "Delivering",
            Self::Completed => "Delivered",
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Online,
}

impl PaymentMethod {
    /// Human-readable label for the dashboard.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Online => "Online",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(!OrderStatus::Created.is_terminal());
        assert!(!OrderStatus::Cooking.is_terminal());
        assert!(!OrderStatus::Delivering.is_terminal());
    }

    #[test]
    fn test_status_sorts_in_workflow_order() {
        let mut statuses = vec![
            OrderStatus::Delivering,
            OrderStatus::Created,
            OrderStatus::Completed,
            OrderStatus::Cooking,
        ];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Created,
                OrderStatus::Cooking,
                OrderStatus::Delivering,
                OrderStatus::Completed,
            ]
        );
    }

    #[test]
    fn test_status_wire_names_match_database_enum() {
        let names: Vec<String> = [
            OrderStatus::Created,
            OrderStatus::Cooking,
            OrderStatus::Delivering,
            OrderStatus::Completed,
        ]
        .iter()
        .map(|status| serde_json::to_string(status).unwrap_or_default())
        .collect();
        assert_eq!(
            names,
            ["\"created\"", "\"cooking\"", "\"delivering\"", "\"completed\""]
        );
    }
}
