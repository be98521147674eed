use tradebook_reminders_domain::Reminder;
use tradebook_reminders_infra::TradebookContext;

/// Sends the reminder as an outbound email, using the per-reminder
/// subject/body overrides when present and the reminder's own content
/// otherwise.
pub async fn send(reminder: &Reminder, ctx: &TradebookContext) -> Result<(), String> {
    let owner = ctx
        .repos
        .owners
        .find(&reminder.owner_id)
        .await
        .ok_or_else(|| format!("Owner {} was not found", reminder.owner_id))?;
    let to = owner
        .email
        .ok_or_else(|| format!("Owner {} has no email address", reminder.owner_id))?;

    let subject = reminder
        .email_subject
        .clone()
        .unwrap_or_else(|| format!("Reminder: {}", reminder.title));
    let body = reminder.email_body.clone().unwrap_or_else(|| {
        if reminder.description.is_empty() {
            reminder.title.clone()
        } else {
            reminder.description.clone()
        }
    });

    ctx.services
        .mailer
        .send(&to, &subject, &body)
        .await
        .map_err(|e| e.to_string())
}
