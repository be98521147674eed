use tradebook_reminders_domain::{DeliveryChannelKind, Reminder, ReminderStatus};
use tradebook_reminders_infra::TradebookContext;
use tracing::debug;

/// Decides whether a due reminder may fire right now. Never errors:
/// every failed check, including a predicate RPC failure, means "skip
/// silently this cycle".
///
/// Checks run in order and short-circuit:
/// 1. the reminder is active and still pending
/// 2. template-driven reminders are not globally switched off by the
///    owner's smart-reminders preference
/// 3. no delivery was already attempted for the current occurrence
///    window (at-most-once-per-occurrence)
/// 4. template-driven reminders pass the external eligibility predicate
pub async fn should_fire(reminder: &Reminder, ctx: &TradebookContext) -> bool {
    if !reminder.is_active || reminder.status != ReminderStatus::Pending {
        return false;
    }

    if reminder.source.template_key().is_some() {
        let prefs = ctx.repos.preferences.find(&reminder.owner_id).await;
        if !prefs.smart_reminders {
            debug!(
                "Smart reminders disabled for owner {}, skipping reminder {}",
                reminder.owner_id, reminder.id
            );
            return false;
        }
    }

    let occurrence_start = match reminder.next_send_at {
        Some(at) => at,
        None => return false,
    };
    let occurrence_end = occurrence_start + ctx.config.occurrence_tolerance_millis;
    let attempts = ctx
        .repos
        .delivery_records
        .find_in_window(&reminder.id, occurrence_start, occurrence_end)
        .await;
    if !attempts.is_empty() {
        debug!(
            "A delivery was already attempted for the current occurrence of reminder {}, skipping",
            reminder.id
        );
        return false;
    }

    if let Some(template_key) = reminder.source.template_key() {
        match ctx
            .services
            .predicate
            .check(&reminder.owner_id, template_key)
            .await
        {
            Ok(true) => {}
            _ => return false,
        }
    }

    true
}

/// The channels the Dispatcher should attempt for this reminder:
/// enabled on the reminder and not globally disabled by the owner's
/// channel preferences.
pub async fn allowed_channels(
    reminder: &Reminder,
    ctx: &TradebookContext,
) -> Vec<DeliveryChannelKind> {
    let prefs = ctx.repos.preferences.find(&reminder.owner_id).await;
    let mut channels = Vec::new();
    if reminder.send_in_app {
        channels.push(DeliveryChannelKind::InApp);
    }
    if reminder.send_email && prefs.email_notifications {
        channels.push(DeliveryChannelKind::Email);
    }
    channels
}
