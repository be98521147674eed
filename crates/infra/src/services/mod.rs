mod bus;
mod mailer;
mod predicate;

pub use bus::{InAppAlert, NotificationBus};
pub use mailer::{IMailer, InMemoryMailer, MailerError, SentEmail, SmtpMailer};
pub use predicate::{HttpEligibilityPredicate, IEligibilityPredicate, StaticEligibilityPredicate};

use crate::config::Config;
use std::sync::Arc;

/// The external capabilities the engine fans delivery out over.
#[derive(Clone)]
pub struct Services {
    pub mailer: Arc<dyn IMailer>,
    pub predicate: Arc<dyn IEligibilityPredicate>,
    pub bus: Arc<NotificationBus>,
}

impl Services {
    pub fn create(config: &Config) -> Self {
        let mailer: Arc<dyn IMailer> = match &config.smtp {
            Some(smtp) => Arc::new(
                SmtpMailer::from_config(smtp).expect("SMTP configuration must be valid"),
            ),
            None => Arc::new(InMemoryMailer::new()),
        };
        let predicate: Arc<dyn IEligibilityPredicate> = match &config.eligibility_predicate_url {
            Some(url) => Arc::new(HttpEligibilityPredicate::new(url.clone())),
            None => Arc::new(StaticEligibilityPredicate { eligible: true }),
        };

        Self {
            mailer,
            predicate,
            bus: Arc::new(NotificationBus::new()),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            mailer: Arc::new(InMemoryMailer::new()),
            predicate: Arc::new(StaticEligibilityPredicate { eligible: true }),
            bus: Arc::new(NotificationBus::new()),
        }
    }
}
