use super::initial_next_send_at;
use crate::error::CoreError;
use crate::shared::usecase::UseCase;
use chrono_tz::Tz;
use tradebook_reminders_domain::{
    Priority, RecurrenceError, RecurrencePattern, Reminder, ReminderCategory, ReminderSource,
    ReminderStatus, ID,
};
use tradebook_reminders_infra::TradebookContext;

/// Validates and persists a new reminder with its first computed
/// `next_send_at`. Invalid input is rejected here; nothing invalid is
/// ever stored as pending.
#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub owner_id: ID,
    pub title: String,
    pub description: String,
    pub category: ReminderCategory,
    pub reminder_time: i64,
    pub timezone: Tz,
    pub recurrence: Option<RecurrencePattern>,
    pub send_email: bool,
    pub send_in_app: bool,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub priority: Priority,
    pub source: ReminderSource,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyTitle,
    ReminderTimeInPast,
    NoChannelEnabled,
    InvalidRecurrence(RecurrenceError),
    StorageError,
}

impl From<UseCaseError> for CoreError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyTitle => Self::BadClientData("The title cannot be empty".into()),
            UseCaseError::ReminderTimeInPast => {
                Self::BadClientData("The reminder time must be in the future".into())
            }
            UseCaseError::NoChannelEnabled => {
                Self::BadClientData("At least one delivery channel must be enabled".into())
            }
            UseCaseError::InvalidRecurrence(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        if self.title.trim().is_empty() {
            return Err(UseCaseError::EmptyTitle);
        }
        if !self.send_email && !self.send_in_app {
            return Err(UseCaseError::NoChannelEnabled);
        }

        let now = ctx.sys.get_timestamp_millis();
        if self.reminder_time <= now {
            return Err(UseCaseError::ReminderTimeInPast);
        }

        let next_send_at =
            initial_next_send_at(&self.recurrence, self.reminder_time, self.timezone, now)
                .map_err(UseCaseError::InvalidRecurrence)?;

        let reminder = Reminder {
            id: Default::default(),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            reminder_time: self.reminder_time,
            timezone: self.timezone,
            recurrence: self.recurrence.clone(),
            send_email: self.send_email,
            send_in_app: self.send_in_app,
            email_subject: self.email_subject.clone(),
            email_body: self.email_body.clone(),
            priority: self.priority,
            is_active: true,
            status: ReminderStatus::Pending,
            source: self.source.clone(),
            next_send_at: Some(next_send_at),
            last_sent_at: None,
            created: now,
            updated: now,
        };

        ctx.repos
            .reminders
            .insert(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }
}
