mod email;
mod in_app;

use futures::future::join_all;
use tradebook_reminders_domain::{DeliveryChannelKind, Reminder};
use tradebook_reminders_infra::TradebookContext;

/// Outcome of one channel attempt, before it is turned into a
/// DeliveryRecord. The failure reason is a plain string because it is
/// only ever stored and shown in history.
#[derive(Debug)]
pub struct ChannelAttempt {
    pub channel: DeliveryChannelKind,
    pub result: Result<(), String>,
}

/// Fans a reminder out over the given channels concurrently. Channel
/// failures are independent; all attempts complete before this
/// returns so no DeliveryRecord is ever lost.
pub async fn send_all(
    reminder: &Reminder,
    channels: &[DeliveryChannelKind],
    ctx: &TradebookContext,
) -> Vec<ChannelAttempt> {
    let attempts = channels.iter().map(|channel| async move {
        let result = match channel {
            DeliveryChannelKind::InApp => in_app::send(reminder, ctx).await,
            DeliveryChannelKind::Email => email::send(reminder, ctx).await,
        };
        ChannelAttempt {
            channel: *channel,
            result,
        }
    });
    join_all(attempts).await
}
