//! Presence Tracker
//!
//! Tracks which users have explicitly announced themselves online. This is
//! deliberately separate from socket registration: registering makes a user
//! addressable for targeted pushes, presence controls whether the rest of
//! the system shows them as online.

use dashmap::DashSet;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct PresenceTracker {
    online: Arc<DashSet<String>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user online; returns false if they were already online
    pub fn mark_online(&self, user_id: &str) -> bool {
        self.online.insert(user_id.to_string())
    }

    /// Mark a user offline; returns false if they were not online
    pub fn mark_offline(&self, user_id: &str) -> bool {
        self.online.remove(user_id).is_some()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    pub fn online_ids(&self) -> Vec<String> {
        self.online.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_offline_round_trip() {
        let presence = PresenceTracker::new();
        assert!(!presence.is_online("user:a"));

        assert!(presence.mark_online("user:a"));
        assert!(presence.is_online("user:a"));
        // Double announce is idempotent
        assert!(!presence.mark_online("user:a"));

        assert!(presence.mark_offline("user:a"));
        assert!(!presence.is_online("user:a"));
        assert!(!presence.mark_offline("user:a"));
    }

    #[test]
    fn online_ids_lists_current_set() {
        let presence = PresenceTracker::new();
        presence.mark_online("user:a");
        presence.mark_online("user:b");
        presence.mark_offline("user:a");

        let ids = presence.online_ids();
        assert_eq!(ids, vec!["user:b".to_string()]);
    }
}
