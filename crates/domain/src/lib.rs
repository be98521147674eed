mod delivery;
mod owner;
mod preferences;
mod recurrence;
mod reminder;
mod shared;
mod smart;
mod template;

pub use delivery::{DeliveryChannelKind, DeliveryOutcome, DeliveryRecord};
pub use owner::Owner;
pub use preferences::NotificationPreferences;
pub use recurrence::{PatternField, RecurrenceError, RecurrencePattern};
pub use reminder::{
    Priority, Reminder, ReminderCategory, ReminderSource, ReminderStatus,
};
pub use shared::entity::{Entity, ID};
pub use smart::{
    market_rules, AllowedDays, SmartCadence, SmartRule, SmartRuleToggle,
};
pub use template::{builtin_templates, NotificationTemplate};
