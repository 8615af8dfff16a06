//! Order Model
//!
//! An order is one requested movement of a product out of inventory. Status
//! transitions follow an explicit table; some transitions carry inventory
//! side effects (see `crate::orders`).

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Order ID type
pub type OrderId = RecordId;

/// Order lifecycle status
///
/// Allowed transitions:
///
/// ```text
/// Pending ──▶ Approved ──▶ Processing ──▶ Shipped ──▶ Delivered
///    │  │         │
///    │  └─▶ Rejected
///    └──────┴─▶ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Approved,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Explicit transition table; anything not listed is denied
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Processing)
                | (Approved, Cancelled)
                | (Processing, Shipped)
                | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Statuses only an admin may set
    pub fn is_privileged(self) -> bool {
        !matches!(self, OrderStatus::Pending | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Approved => "Approved",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Rejected => "Rejected",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "rejected" => Ok(OrderStatus::Rejected),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Order priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for OrderPriority {
    fn default() -> Self {
        OrderPriority::Medium
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Record link to product
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
    pub customer_name: String,
    /// Record link to the user that placed the order
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,
    pub status: OrderStatus,
    #[serde(default)]
    pub priority: OrderPriority,
    pub notes: Option<String>,
    /// `price * quantity`, frozen at creation; recomputed only when the
    /// quantity of a Pending order is edited
    pub total_amount: f64,
    pub ordered_at: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub approved_by: Option<RecordId>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Set only when the order is rejected
    pub rejection_reason: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Place-order payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderCreate {
    pub product: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[serde(default)]
    pub priority: OrderPriority,
    pub notes: Option<String>,
}

/// Edit payload for a Pending order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub quantity: Option<i64>,
    pub priority: Option<OrderPriority>,
    pub notes: Option<String>,
}

/// Status-transition payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub rejection_reason: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// One row of the per-status stats aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBucket {
    pub status: OrderStatus,
    pub count: i64,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_allows_forward_path() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn transition_table_denies_jumps_and_reversals() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn cancellation_only_from_pending_or_approved() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("unknown".parse::<OrderStatus>().is_err());
    }
}
