use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;
use tradebook_reminders_domain::{
    market_rules, NotificationPreferences, Priority, SmartRule, SmartRuleToggle,
};
use tradebook_reminders_infra::ISys;

/// What a timer hands to the UI when a smart rule goes off.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAlert {
    pub rule_key: &'static str,
    pub title: String,
    pub body: String,
    pub priority: Priority,
}

/// Client-side timers for the built-in market rules. Each enabled rule
/// gets a single-shot timer for its next occurrence; a fired timer is
/// not re-armed until the caller invokes [`ClientScheduler::arm`]
/// again, which the UI does on preference changes and on resume.
pub struct ClientScheduler {
    prefs: NotificationPreferences,
    timezone: Tz,
    sys: Arc<dyn ISys>,
    tx: UnboundedSender<LocalAlert>,
    handles: Vec<JoinHandle<()>>,
}

impl ClientScheduler {
    pub fn new(
        prefs: NotificationPreferences,
        timezone: Tz,
        sys: Arc<dyn ISys>,
    ) -> (Self, UnboundedReceiver<LocalAlert>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                prefs,
                timezone,
                sys,
                tx,
                handles: Vec::new(),
            },
            rx,
        )
    }

    pub fn set_preferences(&mut self, prefs: NotificationPreferences) {
        self.prefs = prefs;
    }

    /// Cancels any live timers and arms one timer per enabled rule.
    /// Returns how many timers were armed.
    pub fn arm(&mut self) -> usize {
        self.clear();

        let now = self.sys.get_timestamp_millis();
        for rule in market_rules() {
            if !self.rule_enabled(&rule) {
                debug!("Smart rule {} disabled by preferences, not arming", rule.key);
                continue;
            }
            let fire_at = rule.next_instant(now, self.timezone);
            let delay = Duration::from_millis((fire_at - now).max(0) as u64);
            let tx = self.tx.clone();
            self.handles.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(LocalAlert {
                    rule_key: rule.key,
                    title: rule.title.to_string(),
                    body: rule.body.to_string(),
                    priority: rule.priority,
                });
            }));
        }
        self.handles.len()
    }

    pub fn clear(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    fn rule_enabled(&self, rule: &SmartRule) -> bool {
        if !self.prefs.smart_reminders {
            return false;
        }
        match rule.toggle {
            SmartRuleToggle::TradeReminders => self.prefs.trade_reminders,
            SmartRuleToggle::MarketOpenReminders => self.prefs.market_open_reminders,
            SmartRuleToggle::WeeklyReports => self.prefs.weekly_reports,
        }
    }
}

impl Drop for ClientScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}
