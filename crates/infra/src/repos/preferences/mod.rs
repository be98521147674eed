mod inmemory;

pub use inmemory::InMemoryPreferencesRepo;
use tradebook_reminders_domain::{NotificationPreferences, ID};

#[async_trait::async_trait]
pub trait IPreferencesRepo: Send + Sync {
    /// Owners without a stored blob get the defaults (everything on).
    async fn find(&self, owner_id: &ID) -> NotificationPreferences;
    async fn save(&self, owner_id: &ID, prefs: &NotificationPreferences) -> anyhow::Result<()>;
}
