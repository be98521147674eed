use super::initial_next_send_at;
use crate::error::CoreError;
use crate::shared::usecase::UseCase;
use chrono_tz::Tz;
use tradebook_reminders_domain::{builtin_templates, Reminder, ID};
use tradebook_reminders_infra::{ReminderQuery, TradebookContext};
use tracing::info;

/// Stamps out the built-in notification templates as template-driven
/// reminders for one owner. Called on signup and safe to call again:
/// templates the owner already has a reminder for are skipped, so
/// owner edits to a provisioned reminder survive re-runs.
#[derive(Debug)]
pub struct ProvisionTemplateRemindersUseCase {
    pub owner_id: ID,
    pub timezone: Tz,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for CoreError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for ProvisionTemplateRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "ProvisionTemplateReminders";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let existing = ctx
            .repos
            .reminders
            .find_by_owner(&self.owner_id, ReminderQuery::default())
            .await;

        let mut provisioned = Vec::new();
        for template in builtin_templates() {
            let already_there = existing
                .iter()
                .any(|r| r.source.template_key() == Some(template.key.as_str()));
            if already_there {
                continue;
            }

            let mut reminder = template.instantiate(self.owner_id.clone(), self.timezone, now);
            // Builtin patterns always have a future occurrence
            reminder.next_send_at =
                initial_next_send_at(&reminder.recurrence, reminder.reminder_time, self.timezone, now)
                    .ok();

            ctx.repos
                .reminders
                .insert(&reminder)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            info!(
                "Provisioned template {} for owner {}",
                template.key, self.owner_id
            );
            provisioned.push(reminder);
        }

        Ok(provisioned)
    }
}
