use super::IDeliveryRecordRepo;
use crate::repos::shared::inmemory_repo::*;
use tradebook_reminders_domain::{DeliveryRecord, ID};

pub struct InMemoryDeliveryRecordRepo {
    records: std::sync::Mutex<Vec<DeliveryRecord>>,
}

impl InMemoryDeliveryRecordRepo {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDeliveryRecordRepo for InMemoryDeliveryRecordRepo {
    async fn insert(&self, record: &DeliveryRecord) -> anyhow::Result<()> {
        insert(record, &self.records);
        Ok(())
    }

    async fn find_by_reminder(&self, reminder_id: &ID) -> Vec<DeliveryRecord> {
        find_by(&self.records, |record| record.reminder_id == *reminder_id)
    }

    async fn find_in_window(&self, reminder_id: &ID, start: i64, end: i64) -> Vec<DeliveryRecord> {
        find_by(&self.records, |record| {
            record.reminder_id == *reminder_id
                && record.fired_at >= start
                && record.fired_at < end
        })
    }
}
