use crate::reminder::Priority;
use chrono::{prelude::*, Duration};
use chrono_tz::Tz;

/// Which preference switch gates a smart rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmartRuleToggle {
    TradeReminders,
    MarketOpenReminders,
    WeeklyReports,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmartCadence {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllowedDays {
    Every,
    Weekdays,
    Single(Weekday),
}

/// A fixed, non-persisted market-calendar reminder rule, computed
/// purely from wall-clock time on the client.
#[derive(Debug, Clone)]
pub struct SmartRule {
    pub key: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub hour: u32,
    pub minute: u32,
    pub days: AllowedDays,
    pub cadence: SmartCadence,
    pub priority: Priority,
    pub toggle: SmartRuleToggle,
}

impl SmartRule {
    /// The next future instant (millis) at which this rule fires,
    /// relative to `now_ms` in `timezone`.
    ///
    /// If the target time today has already passed, roll forward one
    /// day (one week for weekly rules); then, for weekday-only rules,
    /// skip exactly Saturday to Monday and Sunday to Monday.
    pub fn next_instant(&self, now_ms: i64, timezone: Tz) -> i64 {
        let now = Utc
            .timestamp_millis_opt(now_ms)
            .single()
            .unwrap_or_else(Utc::now)
            .with_timezone(&timezone);
        let local_now = now.naive_local();

        let mut candidate = local_now.date().and_hms(self.hour, self.minute, 0);
        if candidate <= local_now {
            candidate = candidate
                + match self.cadence {
                    SmartCadence::Daily => Duration::days(1),
                    SmartCadence::Weekly => Duration::days(7),
                };
        }

        candidate = match self.days {
            AllowedDays::Every => candidate,
            AllowedDays::Weekdays => match candidate.weekday() {
                Weekday::Sat => candidate + Duration::days(2),
                Weekday::Sun => candidate + Duration::days(1),
                _ => candidate,
            },
            AllowedDays::Single(day) => {
                let mut c = candidate;
                while c.weekday() != day {
                    c = c + Duration::days(1);
                }
                c
            }
        };

        match timezone.from_local_datetime(&candidate) {
            chrono::LocalResult::Single(instant) => instant.timestamp_millis(),
            chrono::LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
            // Daylight saving gap: the wall-clock time does not exist,
            // shift by an hour
            chrono::LocalResult::None => match timezone.from_local_datetime(&(candidate + Duration::hours(1))) {
                chrono::LocalResult::Single(instant) => instant.timestamp_millis(),
                chrono::LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
                chrono::LocalResult::None => now_ms + Duration::days(1).num_milliseconds(),
            },
        }
    }
}

/// The built-in market-calendar rules: pre-market review before the
/// bell, post-market journal prompt after the close, and a weekly
/// reflection on Sunday evening.
pub fn market_rules() -> Vec<SmartRule> {
    vec![
        SmartRule {
            key: "pre_market_review",
            title: "Pre-market review",
            body: "Markets open soon. Review your watchlist and plan your entries.",
            hour: 9,
            minute: 15,
            days: AllowedDays::Weekdays,
            cadence: SmartCadence::Daily,
            priority: Priority::High,
            toggle: SmartRuleToggle::MarketOpenReminders,
        },
        SmartRule {
            key: "post_market_journal",
            title: "Post-market journal",
            body: "Markets are closed. Log today's trades while they are fresh.",
            hour: 16,
            minute: 15,
            days: AllowedDays::Weekdays,
            cadence: SmartCadence::Daily,
            priority: Priority::Medium,
            toggle: SmartRuleToggle::TradeReminders,
        },
        SmartRule {
            key: "weekly_reflection",
            title: "Weekly reflection",
            body: "Take a few minutes to look back at the week's trades and decisions.",
            hour: 17,
            minute: 0,
            days: AllowedDays::Single(Weekday::Sun),
            cadence: SmartCadence::Weekly,
            priority: Priority::Low,
            toggle: SmartRuleToggle::WeeklyReports,
        },
    ]
}
