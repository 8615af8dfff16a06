//! Notification Repository
//!
//! Persisted notifications only; derived notifications never touch this
//! table (see `crate::notifications`).

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Notification, NotificationType};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const NOTIFICATION_TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        recipient: RecordId,
        sender: RecordId,
        notification_type: NotificationType,
        message: String,
    ) -> RepoResult<Notification> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE notification SET
                    recipient = $recipient,
                    sender = $sender,
                    `type` = $type,
                    message = $message,
                    is_read = false,
                    created_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("recipient", recipient))
            .bind(("sender", sender))
            .bind(("type", notification_type))
            .bind(("message", message))
            .await?;

        let created: Option<Notification> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// All persisted notifications for a recipient, newest first, sender
    /// name resolved
    pub async fn find_by_recipient(&self, recipient: &RecordId) -> RepoResult<Vec<Notification>> {
        let notifications: Vec<Notification> = self
            .base
            .db()
            .query(
                "SELECT *, sender.name AS sender_name FROM notification \
                 WHERE recipient = $recipient ORDER BY created_at DESC",
            )
            .bind(("recipient", recipient.clone()))
            .await?
            .take(0)?;
        Ok(notifications)
    }

    /// Idempotently set `is_read = true`; returns false when the id does
    /// not refer to a persisted record
    pub async fn mark_read(&self, id: &str) -> RepoResult<bool> {
        let rid = match parse_id(NOTIFICATION_TABLE, id) {
            Ok(rid) => rid,
            // Derived ids are not RecordIds at all; treat as a no-op
            Err(_) => return Ok(false),
        };

        let updated: Vec<Notification> = self
            .base
            .db()
            .query("UPDATE $id SET is_read = true RETURN AFTER")
            .bind(("id", rid))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }
}
