use super::IPreferencesRepo;
use std::collections::HashMap;
use std::sync::Mutex;
use tradebook_reminders_domain::{NotificationPreferences, ID};
use tracing::warn;

/// Stores the raw JSON blob and validates its shape on every read, the
/// same way the hosted preference store would be consumed.
pub struct InMemoryPreferencesRepo {
    blobs: Mutex<HashMap<ID, serde_json::Value>>,
}

impl InMemoryPreferencesRepo {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPreferencesRepo for InMemoryPreferencesRepo {
    async fn find(&self, owner_id: &ID) -> NotificationPreferences {
        let blobs = self.blobs.lock().unwrap();
        match blobs.get(owner_id) {
            Some(blob) => serde_json::from_value(blob.clone()).unwrap_or_else(|e| {
                warn!(
                    "Malformed preference blob for owner {}: {}. Using defaults.",
                    owner_id, e
                );
                Default::default()
            }),
            None => Default::default(),
        }
    }

    async fn save(&self, owner_id: &ID, prefs: &NotificationPreferences) -> anyhow::Result<()> {
        let blob = serde_json::to_value(prefs)?;
        self.blobs.lock().unwrap().insert(owner_id.clone(), blob);
        Ok(())
    }
}
