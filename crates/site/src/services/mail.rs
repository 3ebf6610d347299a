//! Outgoing mail.
//!
//! Messages are handed to a [`Mailer`]. With SMTP configured the site sends
//! through [`SmtpMailer`]; otherwise [`LogMailer`] writes each message to the
//! log, body included at debug level.

use std::future::Future;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use folio_core::Email;

use crate::config::{SiteConfig, SmtpConfig};

/// Errors that can occur when handing off a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No delivery channel is configured.
    #[error("delivery channel unavailable")]
    Unavailable,

    /// The channel refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// A plain text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Email,
    pub reply_to: Option<Email>,
    pub subject: String,
    pub body: String,
}

/// Something that can deliver mail.
pub trait Mailer: Sync {
    /// Deliver a message.
    fn send(&self, mail: &OutgoingMail) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Mailer that writes messages to the log.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: Email,
}

impl LogMailer {
    /// Create a mailer sending as `from`.
    #[must_use]
    pub const fn new(from: Email) -> Self {
        Self { from }
    }
}

impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        tracing::info!(
            from = %self.from,
            to = %mail.to,
            reply_to = mail.reply_to.as_ref().map(Email::as_str),
            subject = %mail.subject,
            body_len = mail.body.len(),
            "Outgoing mail"
        );
        tracing::debug!(to = %mail.to, body = %mail.body, "Outgoing mail body");
        Ok(())
    }
}

/// Mailer that delivers over SMTP with STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Email,
}

impl SmtpMailer {
    /// Create an SMTP mailer sending as `from`.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be set up.
    pub fn new(config: &SmtpConfig, from: Email) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = build_message(&self.from, mail)?;

        self.transport.send(message).await.map_err(|e| {
            tracing::warn!(to = %mail.to, error = %e, "SMTP delivery failed");
            DeliveryError::Rejected(e.to_string())
        })?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "Mail sent");
        Ok(())
    }
}

/// The mailer the site runs with.
#[derive(Clone)]
pub enum SiteMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl SiteMailer {
    /// Pick SMTP when it is configured, the log otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if SMTP is configured but the relay cannot be set up.
    pub fn from_config(config: &SiteConfig) -> Result<Self, SmtpError> {
        let from = config.mail_from.clone();
        match &config.smtp {
            Some(smtp) => Ok(Self::Smtp(SmtpMailer::new(smtp, from)?)),
            None => {
                tracing::warn!("SMTP not configured, outgoing mail goes to the log");
                Ok(Self::Log(LogMailer::new(from)))
            }
        }
    }
}

impl Mailer for SiteMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        match self {
            Self::Smtp(mailer) => mailer.send(mail).await,
            Self::Log(mailer) => mailer.send(mail).await,
        }
    }
}

fn mailbox(email: &Email) -> Result<Mailbox, DeliveryError> {
    email
        .as_str()
        .parse()
        .map_err(|_| DeliveryError::Rejected(format!("invalid address: {email}")))
}

/// Build the MIME message for `mail`.
fn build_message(from: &Email, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
    let mut builder = Message::builder()
        .from(mailbox(from)?)
        .to(mailbox(&mail.to)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(mailbox(reply_to)?);
    }

    builder
        .body(mail.body.clone())
        .map_err(|e| DeliveryError::Rejected(e.to_string()))
}
