mod cancel_reminder;
mod complete_reminder;
mod create_reminder;
mod get_reminder;
mod get_reminder_history;
mod get_reminders;
mod provision_templates;
mod update_reminder;

pub use cancel_reminder::CancelReminderUseCase;
pub use complete_reminder::CompleteReminderUseCase;
pub use create_reminder::CreateReminderUseCase;
pub use get_reminder::GetReminderUseCase;
pub use get_reminder_history::GetReminderHistoryUseCase;
pub use get_reminders::GetRemindersUseCase;
pub use provision_templates::ProvisionTemplateRemindersUseCase;
pub use update_reminder::UpdateReminderUseCase;

use chrono_tz::Tz;
use tradebook_reminders_domain::{RecurrenceError, RecurrencePattern};

/// First `next_send_at` for a reminder. One-off reminders fire at
/// their stated time; recurring ones fire at the first pattern hit at
/// or after the stated time (and never in the past).
pub(crate) fn initial_next_send_at(
    recurrence: &Option<RecurrencePattern>,
    reminder_time: i64,
    timezone: Tz,
    now: i64,
) -> Result<i64, RecurrenceError> {
    match recurrence {
        None => Ok(reminder_time),
        Some(pattern) => {
            let after = std::cmp::max(now, reminder_time - 1000 * 60);
            pattern.next_occurrence(after, timezone)
        }
    }
}
