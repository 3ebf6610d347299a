//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Passwordless login (magic link and phone code) and the passcode gate
//! - `mail` - Outgoing mail over SMTP, or to the log
//! - `sms` - Outgoing text messages

pub mod auth;
pub mod mail;
pub mod sms;

pub use mail::{DeliveryError, LogMailer, Mailer, OutgoingMail, SiteMailer, SmtpMailer};
pub use sms::{DisabledSms, SmsSender};
