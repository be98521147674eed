use crate::shared::usecase::UseCase;
use tradebook_reminders_domain::{Reminder, ReminderStatus, ID};
use tradebook_reminders_infra::{ReminderQuery, TradebookContext};

#[derive(Debug)]
pub struct GetRemindersUseCase {
    pub owner_id: ID,
    pub status: Option<ReminderStatus>,
    pub active_only: bool,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for GetRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminders";

    async fn execute(&mut self, ctx: &TradebookContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx
            .repos
            .reminders
            .find_by_owner(
                &self.owner_id,
                ReminderQuery {
                    status: self.status,
                    active_only: self.active_only,
                },
            )
            .await)
    }
}
