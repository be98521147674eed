use crate::config::SmtpConfig;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Invalid email address: {0}")]
    Address(String),
    #[error("SMTP configuration error: {0}")]
    Config(String),
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),
}

/// The outbound email capability: `send(to, subject, body)`. The
/// transport behind it is external; failures are reported, never
/// raised past the Dispatcher.
#[async_trait::async_trait]
pub trait IMailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

/// SMTP transport via lettre. Credentials are resolved from the
/// `SMTP_USERNAME` and `SMTP_PASSWORD` environment variables; without
/// them the connection is unauthenticated.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| MailerError::Address(config.from.clone()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::Config(e.to_string()))?;
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let (Ok(username), Ok(password)) = (
            std::env::var("SMTP_USERNAME"),
            std::env::var("SMTP_PASSWORD"),
        ) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl IMailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let to: Mailbox = to.parse().map_err(|_| MailerError::Address(to.into()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| MailerError::Smtp(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailerError::Smtp(e.to_string()))
    }
}

/// Mailer used when no SMTP transport is configured and in tests.
/// Records every message; can be flipped to fail every send.
pub struct InMemoryMailer {
    pub sent: Mutex<Vec<SentEmail>>,
    failing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        if self.failing {
            return Err(MailerError::Smtp("simulated transport failure".into()));
        }
        info!("Email to {}: {}", to, subject);
        self.sent.lock().unwrap().push(SentEmail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });
        Ok(())
    }
}
