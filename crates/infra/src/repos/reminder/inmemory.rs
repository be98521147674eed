use super::{IReminderRepo, ReminderQuery};
use crate::repos::shared::inmemory_repo::*;
use tradebook_reminders_domain::{Reminder, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        save(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_by_owner(&self, owner_id: &ID, query: ReminderQuery) -> Vec<Reminder> {
        find_by(&self.reminders, |reminder| {
            reminder.owner_id == *owner_id
                && query.status.map_or(true, |s| reminder.status == s)
                && (!query.active_only || reminder.is_active)
        })
    }

    async fn find_due(&self, before: i64) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |reminder| reminder.is_due(before)))
    }
}
