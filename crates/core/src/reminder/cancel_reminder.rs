use crate::error::CoreError;
use crate::shared::usecase::UseCase;
use tradebook_reminders_domain::{Reminder, ReminderStatus, ID};
use tradebook_reminders_infra::TradebookContext;

/// Soft-delete: the reminder keeps its history but will never fire
/// again. Hard deletion is out of scope.
#[derive(Debug)]
pub struct CancelReminderUseCase {
    pub reminder_id: ID,
    pub owner_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    AlreadyTerminal,
    StorageError,
}

impl From<UseCaseError> for CoreError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The reminder with id: {}, was not found.", id))
            }
            UseCaseError::AlreadyTerminal => {
                Self::BadClientData("The reminder is no longer pending".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CancelReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "CancelReminder";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = match ctx.repos.reminders.find(&self.reminder_id).await {
            Some(r) if r.owner_id == self.owner_id => r,
            _ => return Err(UseCaseError::NotFound(self.reminder_id.clone())),
        };
        if reminder.status.is_terminal() {
            return Err(UseCaseError::AlreadyTerminal);
        }

        reminder.status = ReminderStatus::Cancelled;
        reminder.is_active = false;
        reminder.next_send_at = None;
        reminder.updated = ctx.sys.get_timestamp_millis();

        ctx.repos
            .reminders
            .save(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }
}
