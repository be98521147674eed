use serde::{Deserialize, Serialize};

/// Owner-level notification switches. Read by both the Eligibility
/// Guard and the Client Scheduler, always passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    /// Global off-switch for all template-driven reminders. Does not
    /// affect reminders the owner created themselves.
    pub smart_reminders: bool,
    pub trade_reminders: bool,
    pub market_open_reminders: bool,
    pub weekly_reports: bool,
    /// Off-switch for the email channel across all reminders.
    pub email_notifications: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            smart_reminders: true,
            trade_reminders: true,
            market_open_reminders: true,
            weekly_reports: true,
            email_notifications: true,
        }
    }
}
