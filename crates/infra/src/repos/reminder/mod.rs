mod inmemory;

pub use inmemory::InMemoryReminderRepo;
use tradebook_reminders_domain::{Reminder, ReminderStatus, ID};

/// Query shape of the `list` store operation: always owner-scoped,
/// optionally narrowed by status and the soft-disable flag.
#[derive(Debug, Clone, Default)]
pub struct ReminderQuery {
    pub status: Option<ReminderStatus>,
    pub active_only: bool,
}

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    async fn find_by_owner(&self, owner_id: &ID, query: ReminderQuery) -> Vec<Reminder>;
    /// All pending, active reminders with `next_send_at <= before`.
    async fn find_due(&self, before: i64) -> anyhow::Result<Vec<Reminder>>;
}
