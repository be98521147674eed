mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, SmtpConfig};
pub use repos::{
    IDeliveryRecordRepo, IOwnerRepo, IPreferencesRepo, IReminderRepo, InMemoryDeliveryRecordRepo,
    InMemoryOwnerRepo, InMemoryPreferencesRepo, InMemoryReminderRepo, ReminderQuery, Repos,
};
pub use services::{
    HttpEligibilityPredicate, IEligibilityPredicate, IMailer, InAppAlert, InMemoryMailer,
    MailerError, NotificationBus, SentEmail, Services, SmtpMailer, StaticEligibilityPredicate,
};
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticSys};

#[derive(Clone)]
pub struct TradebookContext {
    pub repos: Repos,
    pub config: Config,
    pub services: Services,
    pub sys: Arc<dyn ISys>,
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> TradebookContext {
    let config = Config::new();
    let services = Services::create(&config);
    TradebookContext {
        repos: Repos::create_inmemory(),
        config,
        services,
        sys: Arc::new(RealSys {}),
    }
}

/// Context with in-memory repos and stub services, for tests.
pub fn setup_context_inmemory() -> TradebookContext {
    TradebookContext {
        repos: Repos::create_inmemory(),
        config: Config::new(),
        services: Services::create_inmemory(),
        sys: Arc::new(RealSys {}),
    }
}
