use tradebook_reminders_domain::Reminder;
use tradebook_reminders_infra::{InAppAlert, TradebookContext};
use tracing::debug;

/// Publishes a transient alert on the owner's topic. Fire-and-forget:
/// an owner with no connected client simply misses the alert, which
/// counts as a successful send.
pub async fn send(reminder: &Reminder, ctx: &TradebookContext) -> Result<(), String> {
    let alert = InAppAlert {
        reminder_id: reminder.id.clone(),
        title: reminder.title.clone(),
        description: reminder.description.clone(),
        priority: reminder.priority,
        category: reminder.category,
        display_millis: reminder.priority.display_duration_millis(),
        timestamp: ctx.sys.get_timestamp_millis(),
    };

    let receivers = ctx.services.bus.publish(&reminder.owner_id, alert);
    if receivers == 0 {
        debug!(
            "No client subscribed for owner {}, in-app alert dropped",
            reminder.owner_id
        );
    }
    Ok(())
}
