//! Notification Service
//!
//! Persisted notifications plus the derived feed entries (low stock,
//! pending-order reminders) that are recomputed from current state on every
//! read. Derived entries carry a stable synthetic id but no server-side
//! read state; marking one read is a no-op here and tracked by the client.

use crate::db::models::{
    DerivedKind, DerivedNotification, Notification, NotificationEntry, NotificationType, Role,
};
use crate::db::repository::{
    NotificationRepository, OrderRepository, ProductRepository, UserRepository, parse_id,
};
use crate::realtime::{PushHub, ServerEvent};
use crate::utils::{AppError, AppResult};
use chrono::Utc;
use surrealdb::RecordId;

use crate::db::models::OrderStatus;

/// Synthetic id prefix shared by all derived entries
const DERIVED_PREFIX: &str = "derived:";

#[derive(Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
    products: ProductRepository,
    orders: OrderRepository,
    users: UserRepository,
    hub: PushHub,
}

impl NotificationService {
    pub fn new(
        notifications: NotificationRepository,
        products: ProductRepository,
        orders: OrderRepository,
        users: UserRepository,
        hub: PushHub,
    ) -> Self {
        Self {
            notifications,
            products,
            orders,
            users,
            hub,
        }
    }

    /// Persist a notification and attempt live delivery
    ///
    /// Delivery is best-effort: an offline recipient only sees the persisted
    /// record on their next fetch.
    pub async fn create(
        &self,
        recipient: RecordId,
        sender: RecordId,
        notification_type: NotificationType,
        message: String,
    ) -> AppResult<Notification> {
        let notification = self
            .notifications
            .create(recipient.clone(), sender, notification_type, message)
            .await?;

        if let Ok(payload) = serde_json::to_value(&notification) {
            self.hub
                .send_to(&recipient.to_string(), ServerEvent::Notification(payload));
        }

        Ok(notification)
    }

    /// Create from the admin-facing API payload (string recipient id)
    pub async fn create_for(
        &self,
        recipient_id: &str,
        sender: RecordId,
        notification_type: NotificationType,
        message: String,
    ) -> AppResult<Notification> {
        let recipient = parse_id("user", recipient_id)
            .map_err(|_| AppError::validation(format!("Invalid recipient id: {}", recipient_id)))?;
        self.create(recipient, sender, notification_type, message)
            .await
    }

    /// Fan one notification out to every admin account
    ///
    /// Used by the order lifecycle; failure to reach one admin does not
    /// abort the rest.
    pub async fn notify_admins(
        &self,
        sender: RecordId,
        notification_type: NotificationType,
        message: String,
    ) -> AppResult<()> {
        let admins = self.users.find_by_role(Role::Admin).await?;
        for admin in admins {
            let Some(recipient) = admin.id else { continue };
            if let Err(e) = self
                .create(recipient, sender.clone(), notification_type, message.clone())
                .await
            {
                tracing::warn!(error = %e, "failed to notify admin");
            }
        }
        Ok(())
    }

    /// Full feed for a recipient: persisted records newest first, then the
    /// derived entries (admins only) recomputed from current state
    pub async fn list_feed(
        &self,
        user_id: &str,
        include_derived: bool,
    ) -> AppResult<Vec<NotificationEntry>> {
        let recipient = parse_id("user", user_id)
            .map_err(|_| AppError::validation(format!("Invalid user id: {}", user_id)))?;

        let mut feed: Vec<NotificationEntry> = self
            .notifications
            .find_by_recipient(&recipient)
            .await?
            .into_iter()
            .map(NotificationEntry::Persisted)
            .collect();

        if include_derived {
            feed.extend(self.derived_entries().await?);
        }

        Ok(feed)
    }

    /// Idempotently mark a persisted notification read
    ///
    /// Derived ids (and unknown ids) succeed without touching anything; the
    /// client tracks read state for those itself.
    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        if id.starts_with(DERIVED_PREFIX) {
            return Ok(());
        }
        self.notifications.mark_read(id).await?;
        Ok(())
    }

    async fn derived_entries(&self) -> AppResult<Vec<NotificationEntry>> {
        let mut entries = Vec::new();
        let now = Utc::now();

        for product in self.products.find_low_stock().await? {
            let Some(id) = &product.id else { continue };
            entries.push(NotificationEntry::Derived(DerivedNotification {
                id: format!("{}low_stock:{}", DERIVED_PREFIX, id),
                reason: DerivedKind::LowStock,
                message: format!(
                    "{} is running low ({} left)",
                    product.name, product.quantity
                ),
                created_at: now,
            }));
        }

        let pending = self.orders.count_by_status(OrderStatus::Pending).await?;
        if pending > 0 {
            entries.push(NotificationEntry::Derived(DerivedNotification {
                id: format!("{}pending_orders", DERIVED_PREFIX),
                reason: DerivedKind::PendingOrders,
                message: format!("{} order(s) awaiting approval", pending),
                created_at: now,
            }));
        }

        Ok(entries)
    }
}
