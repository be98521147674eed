use crate::{
    recurrence::RecurrencePattern,
    shared::entity::{Entity, ID},
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCategory {
    General,
    Trading,
    Personal,
    Work,
    Health,
    Finance,
    Learning,
}

impl Default for ReminderCategory {
    fn default() -> Self {
        Self::General
    }
}

/// Drives visual treatment and display duration of in-app alerts,
/// never delivery ordering.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
    Urgent = 4,
}

impl Priority {
    /// How long a transient in-app alert for this priority should stay
    /// on screen.
    pub fn display_duration_millis(&self) -> i64 {
        match self {
            Self::Low | Self::Medium => 1000 * 5,
            Self::High => 1000 * 10,
            Self::Urgent => 1000 * 20,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Cancelled,
    Completed,
}

impl ReminderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Who created the reminder. Template-driven reminders are suppressed
/// as a group by the owner's global smart-reminders preference and are
/// subject to the external eligibility predicate; owner-created
/// reminders are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "key", rename_all = "lowercase")]
pub enum ReminderSource {
    Owner,
    Template(String),
}

impl ReminderSource {
    pub fn template_key(&self) -> Option<&str> {
        match self {
            Self::Owner => None,
            Self::Template(key) => Some(key),
        }
    }
}

/// A scheduled one-off or recurring reminder owned by a single user.
///
/// All timestamps are UTC milliseconds. `timezone` is the timezone the
/// recurrence pattern is evaluated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ID,
    pub owner_id: ID,
    pub title: String,
    pub description: String,
    pub category: ReminderCategory,
    pub reminder_time: i64,
    pub timezone: Tz,
    pub recurrence: Option<RecurrencePattern>,
    pub send_email: bool,
    pub send_in_app: bool,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub priority: Priority,
    pub is_active: bool,
    pub status: ReminderStatus,
    pub source: ReminderSource,
    pub next_send_at: Option<i64>,
    pub last_sent_at: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

impl Reminder {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Whether the Dispatcher should consider this reminder in a due
    /// query at `now`.
    pub fn is_due(&self, now: i64) -> bool {
        self.is_active
            && self.status == ReminderStatus::Pending
            && matches!(self.next_send_at, Some(at) if at <= now)
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}
