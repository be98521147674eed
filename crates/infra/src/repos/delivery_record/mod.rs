mod inmemory;

pub use inmemory::InMemoryDeliveryRecordRepo;
use tradebook_reminders_domain::{DeliveryRecord, ID};

#[async_trait::async_trait]
pub trait IDeliveryRecordRepo: Send + Sync {
    async fn insert(&self, record: &DeliveryRecord) -> anyhow::Result<()>;
    async fn find_by_reminder(&self, reminder_id: &ID) -> Vec<DeliveryRecord>;
    /// Records fired inside `[start, end)` for the given reminder. The
    /// Eligibility Guard uses this for the occurrence idempotency check.
    async fn find_in_window(&self, reminder_id: &ID, start: i64, end: i64) -> Vec<DeliveryRecord>;
}
