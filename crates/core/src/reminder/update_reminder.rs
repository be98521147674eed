use super::initial_next_send_at;
use crate::error::CoreError;
use crate::shared::usecase::UseCase;
use chrono_tz::Tz;
use tradebook_reminders_domain::{
    Priority, RecurrenceError, RecurrencePattern, Reminder, ReminderCategory, ReminderStatus, ID,
};
use tradebook_reminders_infra::TradebookContext;

/// Partial edit of an owned reminder. `None` fields are left
/// untouched; `recurrence` is doubly optional so a recurring reminder
/// can be turned back into a one-off.
#[derive(Debug)]
pub struct UpdateReminderUseCase {
    pub reminder_id: ID,
    pub owner_id: ID,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ReminderCategory>,
    pub reminder_time: Option<i64>,
    pub timezone: Option<Tz>,
    pub recurrence: Option<Option<RecurrencePattern>>,
    pub send_email: Option<bool>,
    pub send_in_app: Option<bool>,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub priority: Option<Priority>,
}

impl UpdateReminderUseCase {
    pub fn new(reminder_id: ID, owner_id: ID) -> Self {
        Self {
            reminder_id,
            owner_id,
            title: None,
            description: None,
            category: None,
            reminder_time: None,
            timezone: None,
            recurrence: None,
            send_email: None,
            send_in_app: None,
            email_subject: None,
            email_body: None,
            priority: None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    EmptyTitle,
    ReminderTimeInPast,
    NoChannelEnabled,
    AlreadyTerminal,
    InvalidRecurrence(RecurrenceError),
    StorageError,
}

impl From<UseCaseError> for CoreError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The reminder with id: {}, was not found.", id))
            }
            UseCaseError::EmptyTitle => Self::BadClientData("The title cannot be empty".into()),
            UseCaseError::ReminderTimeInPast => {
                Self::BadClientData("The reminder time must be in the future".into())
            }
            UseCaseError::NoChannelEnabled => {
                Self::BadClientData("At least one delivery channel must be enabled".into())
            }
            UseCaseError::AlreadyTerminal => {
                Self::BadClientData("A cancelled, completed or sent reminder cannot be edited".into())
            }
            UseCaseError::InvalidRecurrence(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminder";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = match ctx.repos.reminders.find(&self.reminder_id).await {
            Some(r) if r.owner_id == self.owner_id => r,
            _ => return Err(UseCaseError::NotFound(self.reminder_id.clone())),
        };
        if reminder.status.is_terminal() {
            return Err(UseCaseError::AlreadyTerminal);
        }

        let now = ctx.sys.get_timestamp_millis();

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(UseCaseError::EmptyTitle);
            }
            reminder.title = title.clone();
        }
        if let Some(description) = &self.description {
            reminder.description = description.clone();
        }
        if let Some(category) = self.category {
            reminder.category = category;
        }
        if let Some(priority) = self.priority {
            reminder.priority = priority;
        }
        if let Some(subject) = &self.email_subject {
            reminder.email_subject = Some(subject.clone());
        }
        if let Some(body) = &self.email_body {
            reminder.email_body = Some(body.clone());
        }
        if let Some(send_email) = self.send_email {
            reminder.send_email = send_email;
        }
        if let Some(send_in_app) = self.send_in_app {
            reminder.send_in_app = send_in_app;
        }
        if !reminder.send_email && !reminder.send_in_app {
            return Err(UseCaseError::NoChannelEnabled);
        }

        let schedule_changed =
            self.reminder_time.is_some() || self.timezone.is_some() || self.recurrence.is_some();

        if let Some(reminder_time) = self.reminder_time {
            if reminder_time <= now {
                return Err(UseCaseError::ReminderTimeInPast);
            }
            reminder.reminder_time = reminder_time;
        }
        if let Some(timezone) = self.timezone {
            reminder.timezone = timezone;
        }
        if let Some(recurrence) = &self.recurrence {
            reminder.recurrence = recurrence.clone();
        }

        if schedule_changed {
            let next_send_at = initial_next_send_at(
                &reminder.recurrence,
                reminder.reminder_time,
                reminder.timezone,
                now,
            )
            .map_err(UseCaseError::InvalidRecurrence)?;
            reminder.next_send_at = Some(next_send_at);
        }

        reminder.updated = now;

        ctx.repos
            .reminders
            .save(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reminder::CreateReminderUseCase;
    use crate::shared::usecase::execute;
    use chrono_tz::UTC;
    use std::sync::Arc;
    use tradebook_reminders_domain::ReminderSource;
    use tradebook_reminders_infra::{setup_context_inmemory, StaticSys, TradebookContext};

    async fn insert_reminder(ctx: &TradebookContext, owner_id: ID) -> Reminder {
        execute(
            CreateReminderUseCase {
                owner_id,
                title: "Check margin".into(),
                description: "".into(),
                category: ReminderCategory::Finance,
                reminder_time: 100_000,
                timezone: UTC,
                recurrence: None,
                send_email: false,
                send_in_app: true,
                email_subject: None,
                email_body: None,
                priority: Priority::Medium,
                source: ReminderSource::Owner,
            },
            ctx,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn postponing_recomputes_next_send_at() {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticSys(1000));
        let owner_id = ID::new();
        let reminder = insert_reminder(&ctx, owner_id.clone()).await;

        let mut uc = UpdateReminderUseCase::new(reminder.id.clone(), owner_id);
        uc.reminder_time = Some(200_000);
        let updated = execute(uc, &ctx).await.unwrap();

        assert_eq!(updated.next_send_at, Some(200_000));
        assert_eq!(updated.status, ReminderStatus::Pending);
    }

    #[tokio::test]
    async fn other_owner_cannot_edit() {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticSys(1000));
        let reminder = insert_reminder(&ctx, ID::new()).await;

        let mut uc = UpdateReminderUseCase::new(reminder.id.clone(), ID::new());
        uc.title = Some("hijacked".into());
        let res = execute(uc, &ctx).await;
        assert!(matches!(res.unwrap_err(), UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn cannot_disable_all_channels() {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticSys(1000));
        let owner_id = ID::new();
        let reminder = insert_reminder(&ctx, owner_id.clone()).await;

        let mut uc = UpdateReminderUseCase::new(reminder.id.clone(), owner_id);
        uc.send_in_app = Some(false);
        let res = execute(uc, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NoChannelEnabled);
    }

    #[tokio::test]
    async fn untouched_fields_are_preserved() {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticSys(1000));
        let owner_id = ID::new();
        let reminder = insert_reminder(&ctx, owner_id.clone()).await;

        let mut uc = UpdateReminderUseCase::new(reminder.id.clone(), owner_id);
        uc.description = Some("Margin call season".into());
        let updated = execute(uc, &ctx).await.unwrap();

        assert_eq!(updated.title, reminder.title);
        assert_eq!(updated.next_send_at, reminder.next_send_at);
        assert_eq!(updated.description, "Margin call season");
    }
}
