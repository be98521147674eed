use tracing::warn;

/// Millis of slack around `next_send_at` inside which a second fire
/// attempt for the same occurrence is suppressed. Absorbs polling
/// jitter; must stay at least as large as the dispatch interval.
const DEFAULT_OCCURRENCE_TOLERANCE_MINS: i64 = 5;
const DEFAULT_DISPATCH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    /// Sender address, e.g. "Tradebook <reminders@tradebook.app>"
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds between Dispatcher polling cycles
    pub dispatch_interval_secs: u64,
    /// Width in millis of the idempotency window used by the
    /// Eligibility Guard
    pub occurrence_tolerance_millis: i64,
    /// SMTP transport settings; when absent the email channel logs
    /// instead of sending
    pub smtp: Option<SmtpConfig>,
    /// Endpoint of the external eligibility predicate for
    /// template-driven notifications; when absent templates are
    /// always considered eligible
    pub eligibility_predicate_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        let dispatch_interval_secs = env_number(
            "DISPATCH_INTERVAL_SECS",
            DEFAULT_DISPATCH_INTERVAL_SECS as i64,
        ) as u64;
        let tolerance_mins = env_number(
            "OCCURRENCE_TOLERANCE_MINS",
            DEFAULT_OCCURRENCE_TOLERANCE_MINS,
        );

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => {
                let port = std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse::<u16>().ok());
                match std::env::var("SMTP_FROM") {
                    Ok(from) => Some(SmtpConfig { host, port, from }),
                    Err(_) => {
                        warn!("SMTP_HOST is set but SMTP_FROM is missing, disabling the SMTP transport.");
                        None
                    }
                }
            }
            Err(_) => None,
        };

        Self {
            dispatch_interval_secs,
            occurrence_tolerance_millis: tolerance_mins * 60 * 1000,
            smtp,
            eligibility_predicate_url: std::env::var("ELIGIBILITY_PREDICATE_URL").ok(),
        }
    }
}

fn env_number(var: &str, default: i64) -> i64 {
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<i64>() {
            Ok(value) if value > 0 => value,
            _ => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    var, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
