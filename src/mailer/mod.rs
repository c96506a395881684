//! Contact-form mailer.
//!
//! A submission is validated, composed into a plain-text email and handed to the configured
//! provider. Without a provider credential the send is simulated after a fixed delay and the
//! receipt says so.

pub mod resend;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MailConfig;
use crate::content::ContentError;

pub use resend::ResendProvider;

pub const SEND_FAILED_MESSAGE: &str = "Failed to send message. Please try again later.";
pub const SENT_MESSAGE: &str = "Thank you for your message! We'll get back to you within 24 hours.";
pub const SIMULATED_MESSAGE: &str =
    "[SIMULATED] Message accepted, but email delivery is not configured so nothing was sent.";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
}

impl ContactForm {
    /// Field-attributed checks. Performs no I/O.
    pub fn validate(&self) -> Result<(), ContentError> {
        let mut errors = BTreeMap::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name".to_string(), "Name is required".to_string());
        } else if name.chars().count() < 2 {
            errors.insert("name".to_string(), "Name must be at least 2 characters".to_string());
        }

        if !self.email.trim().contains('@') {
            errors.insert("email".to_string(), "Please enter a valid email address".to_string());
        }

        if self.message.trim().chars().count() < 10 {
            errors.insert("message".to_string(), "Message must be at least 10 characters".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContentError::fields(errors))
        }
    }

    fn compose(&self, from: &str, to: &str) -> OutboundEmail {
        let name = self.name.trim();
        let subject = match self.subject.as_deref().map(str::trim) {
            Some(subject) if !subject.is_empty() => subject.to_string(),
            _ => format!("New contact form submission from {}", name),
        };

        let mut body = format!("Name: {}\nEmail: {}\n", name, self.email.trim());
        for (label, value) in [("Company", &self.company), ("Phone", &self.phone)] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                body.push_str(&format!("{}: {}\n", label, value));
            }
        }
        body.push_str(&format!("\nMessage:\n{}\n", self.message.trim()));

        OutboundEmail {
            from: from.to_string(),
            to: to.to_string(),
            reply_to: self.email.trim().to_string(),
            subject,
            body,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactOutcome {
    Sent,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub outcome: ContactOutcome,
    pub simulated: bool,
    pub message: String,
}

pub struct Mailer {
    provider: Option<Arc<dyn MailProvider>>,
    from: String,
    to: String,
    simulate_delay: Duration,
}

impl Mailer {
    pub fn new(provider: Option<Arc<dyn MailProvider>>, from: impl Into<String>, to: impl Into<String>, simulate_delay: Duration) -> Self {
        Self {
            provider,
            from: from.into(),
            to: to.into(),
            simulate_delay,
        }
    }

    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let provider: Option<Arc<dyn MailProvider>> = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Some(Arc::new(ResendProvider::new(
                config.api_base.clone(),
                key,
                Duration::from_millis(config.timeout_ms),
            )?)),
            None => None,
        };
        Ok(Self::new(
            provider,
            config.from.clone(),
            config.to.clone(),
            Duration::from_millis(config.simulate_delay_ms),
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn MailProvider>, ContentError> {
        self.provider.as_ref().ok_or(ContentError::ConfigurationMissing("MAIL_API_KEY"))
    }

    pub async fn submit(&self, form: &ContactForm) -> Result<ContactReceipt, ContentError> {
        form.validate()?;

        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(ContentError::ConfigurationMissing(_)) => return Ok(self.simulate(form).await),
            Err(err) => return Err(err),
        };

        let email = form.compose(&self.from, &self.to);
        if let Err(err) = provider.send(&email).await {
            tracing::error!("contact email from {} failed: {}", email.reply_to, err);
            return Err(ContentError::StoreUnavailable(SEND_FAILED_MESSAGE.to_string()));
        }

        tracing::info!("contact email sent for {}", email.reply_to);
        Ok(ContactReceipt {
            outcome: ContactOutcome::Sent,
            simulated: false,
            message: SENT_MESSAGE.to_string(),
        })
    }

    async fn simulate(&self, form: &ContactForm) -> ContactReceipt {
        tokio::time::sleep(self.simulate_delay).await;
        tracing::info!("mail provider not configured, simulated contact submission from {}", form.email.trim());
        ContactReceipt {
            outcome: ContactOutcome::Simulated,
            simulated: true,
            message: SIMULATED_MESSAGE.to_string(),
        }
    }
}
