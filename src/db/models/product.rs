//! Product Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Product ID type
pub type ProductId = RecordId;

/// Default low-stock threshold when a product does not set one
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Sellable inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    /// Record link to category
    #[serde(with = "serde_helpers::record_id")]
    pub category: RecordId,
    /// Record link to supplier
    #[serde(with = "serde_helpers::record_id")]
    pub supplier: RecordId,
    /// Unit price
    pub price: f64,
    /// On-hand quantity; never driven negative through the order path
    pub quantity: i64,
    #[serde(default = "default_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

fn default_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Create product payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1))]
    pub name: String,
    pub category: String,
    pub supplier: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
    pub description: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub price: Option<f64>,
    /// Manual inventory adjustment; order-driven deltas go through the
    /// lifecycle manager instead
    pub quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub description: Option<String>,
}
