mod delivery_record;
mod owner;
mod preferences;
mod reminder;
mod shared;

pub use delivery_record::{IDeliveryRecordRepo, InMemoryDeliveryRecordRepo};
pub use owner::{IOwnerRepo, InMemoryOwnerRepo};
pub use preferences::{IPreferencesRepo, InMemoryPreferencesRepo};
pub use reminder::{IReminderRepo, InMemoryReminderRepo, ReminderQuery};
use std::sync::Arc;

/// The narrow store surface the engine consumes. The hosted data store
/// behind it is substitutable; the in-memory implementations double as
/// the test harness.
#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub delivery_records: Arc<dyn IDeliveryRecordRepo>,
    pub owners: Arc<dyn IOwnerRepo>,
    pub preferences: Arc<dyn IPreferencesRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::new()),
            delivery_records: Arc::new(InMemoryDeliveryRecordRepo::new()),
            owners: Arc::new(InMemoryOwnerRepo::new()),
            preferences: Arc::new(InMemoryPreferencesRepo::new()),
        }
    }
}
