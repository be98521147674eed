use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tradebook_reminders_domain::{Priority, ReminderCategory, ID};

const TOPIC_CAPACITY: usize = 64;

/// Payload published on an owner's topic when an in-app alert fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InAppAlert {
    pub reminder_id: ID,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: ReminderCategory,
    /// How long the client should keep the alert on screen, derived
    /// from the priority.
    pub display_millis: i64,
    pub timestamp: i64,
}

/// Per-owner publish/subscribe fan-out to connected clients.
///
/// Delivery is fire-and-forget: publishing to a topic nobody is
/// subscribed to drops the alert. Durability lives at the data level
/// (the reminder's pending state), not at the transport level.
pub struct NotificationBus {
    topics: Mutex<HashMap<ID, broadcast::Sender<InAppAlert>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, owner_id: &ID) -> broadcast::Receiver<InAppAlert> {
        let mut topics = self.topics.lock().unwrap();
        topics
            .entry(owner_id.clone())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Returns the number of clients the alert reached. Zero is not an
    /// error.
    pub fn publish(&self, owner_id: &ID, alert: InAppAlert) -> usize {
        let topics = self.topics.lock().unwrap();
        match topics.get(owner_id) {
            Some(topic) => topic.send(alert).unwrap_or(0),
            None => 0,
        }
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
