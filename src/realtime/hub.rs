//! PushHub — server-to-client event routing
//!
//! ```text
//! order/notification services
//!       │ ServerEvent
//!       ▼
//! PushHub
//!   ├── connections: user_id → mpsc::Sender (targeted delivery)
//!   └── broadcast: Sender<ServerEvent> (fan-out to every socket)
//!           │
//!           ▼
//! WS socket loop (forward as JSON text frames)
//! ```
//!
//! Targeted sends to users without a registered connection are dropped
//! silently; persisted notifications are the durable path.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Broadcast channel capacity, enough to absorb connect-time bursts
const BROADCAST_CAPACITY: usize = 256;

/// Per-connection mailbox depth
const MAILBOX_CAPACITY: usize = 32;

/// Events pushed to clients, serialized as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A product's on-hand quantity changed
    StockUpdate {
        #[serde(rename = "productId")]
        product_id: String,
        quantity: i64,
    },
    /// A notification payload for the receiving user
    Notification(serde_json::Value),
    /// A user announced presence
    UserOnline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// A previously announced user disconnected
    UserOffline {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

/// Global push hub, shared across all sockets and services
#[derive(Clone)]
pub struct PushHub {
    /// user_id → sender for that user's socket
    connections: Arc<DashMap<String, mpsc::Sender<ServerEvent>>>,
    tx: broadcast::Sender<ServerEvent>,
}

impl Default for PushHub {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            connections: Arc::new(DashMap::new()),
            tx,
        }
    }
}

impl PushHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket for targeted delivery
    ///
    /// Returns the receiving end plus a handle identifying this
    /// registration. A second registration for the same user replaces the
    /// first, so the newest socket wins.
    pub fn register(
        &self,
        user_id: &str,
    ) -> (mpsc::Sender<ServerEvent>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        self.connections.insert(user_id.to_string(), tx.clone());
        (tx, rx)
    }

    /// Drop a user's targeted-delivery entry
    ///
    /// Only removes the mapping while it still belongs to `handle`, so a
    /// stale disconnect cannot evict a newer socket.
    pub fn unregister(&self, user_id: &str, handle: &mpsc::Sender<ServerEvent>) {
        self.connections
            .remove_if(user_id, |_, tx| tx.same_channel(handle));
    }

    pub fn is_registered(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Deliver an event to one user, dropping it if they are offline or
    /// their mailbox is full
    pub fn send_to(&self, user_id: &str, event: ServerEvent) {
        if let Some(entry) = self.connections.get(user_id) {
            if entry.try_send(event).is_err() {
                tracing::debug!(user_id, "dropping event for saturated or closed mailbox");
            }
        }
    }

    /// Fan an event out to every connected socket
    ///
    /// send returns Err when nobody is subscribed, which is fine.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to the broadcast stream (one per socket loop)
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn targeted_delivery_reaches_registered_user() {
        let hub = PushHub::new();
        let (_handle, mut rx) = hub.register("user:alice");

        hub.send_to(
            "user:alice",
            ServerEvent::StockUpdate {
                product_id: "product:p1".into(),
                quantity: 7,
            },
        );

        match rx.recv().await.unwrap() {
            ServerEvent::StockUpdate {
                product_id,
                quantity,
            } => {
                assert_eq!(product_id, "product:p1");
                assert_eq!(quantity, 7);
            }
            other => panic!("Expected StockUpdate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_to_unregistered_user_is_silent() {
        let hub = PushHub::new();
        // No panic, no error
        hub.send_to(
            "user:ghost",
            ServerEvent::Notification(serde_json::json!({"message": "hi"})),
        );
    }

    #[tokio::test]
    async fn reregistration_replaces_previous_socket() {
        let hub = PushHub::new();
        let (old_handle, mut old_rx) = hub.register("user:bob");
        let (_new_handle, mut new_rx) = hub.register("user:bob");

        // Stale disconnect of the replaced socket must not evict the new one
        hub.unregister("user:bob", &old_handle);
        assert!(hub.is_registered("user:bob"));

        hub.send_to(
            "user:bob",
            ServerEvent::UserOnline {
                user_id: "user:bob".into(),
            },
        );

        assert!(new_rx.recv().await.is_some());
        drop(old_handle);
        // Old channel's hub-side sender was dropped on replacement
        assert!(old_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_all_subscribers() {
        let hub = PushHub::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        hub.broadcast(ServerEvent::UserOffline {
            user_id: "user:carol".into(),
        });

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                ServerEvent::UserOffline { user_id } => assert_eq!(user_id, "user:carol"),
                other => panic!("Expected UserOffline, got {other:?}"),
            }
        }
    }

    #[test]
    fn events_serialize_with_event_tag() {
        let json = serde_json::to_value(ServerEvent::StockUpdate {
            product_id: "product:p1".into(),
            quantity: 2,
        })
        .unwrap();

        assert_eq!(json["event"], "stock_update");
        assert_eq!(json["data"]["productId"], "product:p1");
        assert_eq!(json["data"]["quantity"], 2);
    }
}
