//! Email service for contact form delivery.
//!
//! Uses SMTP via lettre when a relay is configured. Without one, messages
//! are kept in an in-memory [`Outbox`] and logged, which is also what tests
//! inspect.

use std::sync::{Arc, Mutex, PoisonError};

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Plain text template for a contact form message.
#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactEmailText<'a> {
    email: &'a str,
    text: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A message that has been handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// In-memory record of sent messages.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Arc<Mutex<Vec<SentEmail>>>,
}

impl Outbox {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, email: SentEmail) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email);
    }

    /// Snapshot of every message sent so far.
    #[must_use]
    pub fn messages(&self) -> Vec<SentEmail> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of messages sent so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Outbox(Outbox),
}

/// Email service for sending site mail.
#[derive(Clone)]
pub struct EmailService {
    transport: Transport,
    from_address: Mailbox,
    contact_recipient: Mailbox,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an address is malformed or the SMTP relay
    /// cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let transport = match &config.smtp {
            Some(smtp) => {
                let credentials = Credentials::new(
                    smtp.username.clone(),
                    smtp.password.expose_secret().to_string(),
                );

                let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
                    .port(smtp.port)
                    .credentials(credentials)
                    .build();
                tracing::info!(host = %smtp.host, port = smtp.port, "SMTP transport configured");
                Transport::Smtp(mailer)
            }
            None => {
                tracing::warn!("SMTP_HOST not set, outgoing mail is kept in memory");
                Transport::Outbox(Outbox::new())
            }
        };

        Ok(Self {
            transport,
            from_address: parse_mailbox(&config.from_address)?,
            contact_recipient: parse_mailbox(&config.contact_recipient)?,
        })
    }

    /// Create a service that records messages into the given outbox.
    ///
    /// # Errors
    ///
    /// Returns an error if an address in the configuration is malformed.
    pub fn with_outbox(config: &EmailConfig, outbox: Outbox) -> Result<Self, EmailError> {
        Ok(Self {
            transport: Transport::Outbox(outbox),
            from_address: parse_mailbox(&config.from_address)?,
            contact_recipient: parse_mailbox(&config.contact_recipient)?,
        })
    }

    /// Deliver a contact form submission to the shop's inbox.
    ///
    /// The body carries the sender address and their message verbatim; the
    /// sender is also set as `Reply-To`.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be rendered, built or sent.
    pub async fn send_contact_message(&self, sender: &str, text: &str) -> Result<(), EmailError> {
        let body = ContactEmailText {
            email: sender,
            text,
        }
        .render()?;

        let reply_to = parse_mailbox(sender)?;
        let subject = format!("Contact form message from {sender}");

        let message = Message::builder()
            .from(self.from_address.clone())
            .reply_to(reply_to)
            .to(self.contact_recipient.clone())
            .subject(subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(body.clone())?;

        match &self.transport {
            Transport::Smtp(mailer) => {
                mailer.send(message).await?;
            }
            Transport::Outbox(outbox) => {
                tracing::debug!(body = %body, "Outgoing message kept in outbox");
                outbox.push(SentEmail {
                    to: self.contact_recipient.to_string(),
                    reply_to: Some(sender.to_string()),
                    subject: subject.clone(),
                    body,
                });
            }
        }

        tracing::info!(to = %self.contact_recipient, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            contact_recipient: "hello@shopfront.test".to_string(),
            from_address: "Shopfront <noreply@shopfront.test>".to_string(),
            smtp: None,
        }
    }

    #[tokio::test]
    async fn test_contact_message_lands_in_outbox() {
        let outbox = Outbox::new();
        let service = EmailService::with_outbox(&config(), outbox.clone()).unwrap();

        service
            .send_contact_message("buyer@example.com", "Do you ship to Oslo?")
            .await
            .unwrap();

        let sent = outbox.messages();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert!(email.to.contains("hello@shopfront.test"));
        assert_eq!(email.reply_to.as_deref(), Some("buyer@example.com"));
        assert!(email.body.contains("buyer@example.com"));
        assert!(email.body.contains("Do you ship to Oslo?"));
    }

    #[tokio::test]
    async fn test_invalid_sender_is_rejected_before_sending() {
        let outbox = Outbox::new();
        let service = EmailService::with_outbox(&config(), outbox.clone()).unwrap();

        let result = service.send_contact_message("not an address", "hi").await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_new_without_smtp_uses_outbox() {
        let service = EmailService::new(&config()).unwrap();
        assert!(matches!(service.transport, Transport::Outbox(_)));
    }

    #[test]
    fn test_bad_from_address_is_a_config_error() {
        let mut config = config();
        config.from_address = "nope".to_string();
        assert!(matches!(
            EmailService::new(&config),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
