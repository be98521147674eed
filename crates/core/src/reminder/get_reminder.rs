use crate::error::CoreError;
use crate::shared::usecase::UseCase;
use tradebook_reminders_domain::{Reminder, ID};
use tradebook_reminders_infra::TradebookContext;

#[derive(Debug)]
pub struct GetReminderUseCase {
    pub reminder_id: ID,
    pub owner_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for CoreError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The reminder with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait]
impl UseCase for GetReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminder";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.reminders.find(&self.reminder_id).await {
            Some(r) if r.owner_id == self.owner_id => Ok(r),
            _ => Err(UseCaseError::NotFound(self.reminder_id.clone())),
        }
    }
}
