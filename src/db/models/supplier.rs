//! Supplier Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Supplier ID type
pub type SupplierId = RecordId;

/// Product supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SupplierId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Create supplier payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupplierCreate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Update supplier payload
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
