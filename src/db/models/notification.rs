//! Notification Models
//!
//! Two explicitly separate kinds:
//! - [`Notification`] — a persisted per-recipient record with server-side
//!   read state
//! - [`DerivedNotification`] — computed on each read from current
//!   product/order state, never persisted; read/cleared state lives only in
//!   the client

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Notification ID type
pub type NotificationId = RecordId;

/// Persisted notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderPlaced,
    OrderStatusUpdate,
    LowStock,
}

/// Persisted per-recipient notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<NotificationId>,
    /// Record link to the recipient user
    #[serde(with = "serde_helpers::record_id")]
    pub recipient: RecordId,
    /// Record link to the sender user (system actions use the acting admin)
    #[serde(with = "serde_helpers::record_id")]
    pub sender: RecordId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
    /// Resolved at read time, not stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

/// Create payload for the admin-facing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationCreate {
    pub recipient: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
}

/// Derived notification kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedKind {
    LowStock,
    PendingOrders,
}

/// Notification computed at read time from current state
///
/// The synthetic id is stable for a given subject so the client can track
/// its own read/cleared state across polls.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedNotification {
    pub id: String,
    pub reason: DerivedKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of the notification feed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEntry {
    Persisted(Notification),
    Derived(DerivedNotification),
}
