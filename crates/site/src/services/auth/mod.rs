//! Passwordless login.
//!
//! A user asks for a code with their email or phone number. Depending on the
//! user's [`PasscodeRoute`] they receive a magic link by mail or a six digit
//! code by text message. Either is accepted only while the [`PasscodeGate`]
//! admits the user's `login_date`.

mod error;
pub mod gate;

pub use error::AuthError;
pub use gate::{DEFAULT_WINDOW_MINUTES, PasscodeGate, parse_login_date, within_window};

use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::instrument;

use folio_core::{LoginIdentifier, PasscodeRoute, PhoneNumber};

use crate::clock::Clock;
use crate::db::UserStore;
use crate::models::User;
use crate::services::mail::{Mailer, OutgoingMail};
use crate::services::sms::SmsSender;

/// Length of a magic link token.
pub const MAGIC_LINK_LENGTH: usize = 32;

/// Result of a code request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRequest {
    /// A code was generated and handed to the user's route.
    Sent(PasscodeRoute),
    /// No user matches the login. Callers answer exactly as for `Sent`.
    Unknown,
}

/// Generate a magic link token.
#[must_use]
pub fn generate_magic_link() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(MAGIC_LINK_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate a six digit phone code.
#[must_use]
pub fn generate_phone_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// A login code addressed to the user's route.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Delivery {
    Sms {
        to: PhoneNumber,
        body: String,
    },
    Mail(OutgoingMail),
}

/// Address the user's current code to their passcode route.
fn plan_delivery(user: &User, base_url: &str, window_minutes: i64) -> Result<Delivery, AuthError> {
    match user.passcode_route {
        PasscodeRoute::Phone => {
            let to = user.phone.clone().ok_or(AuthError::NoPhone)?;
            let code = user.phone_code.as_ref().ok_or(AuthError::MissingCode)?;
            Ok(Delivery::Sms {
                to,
                body: format!("Your login code is {code}"),
            })
        }
        PasscodeRoute::Email => {
            let token = user.magic_link.as_ref().ok_or(AuthError::MissingCode)?;
            let link = format!("{}/auth/magic/{token}", base_url.trim_end_matches('/'));
            let name = user.public_name();
            let body = format!(
                "Hello {name},\n\nUse this link to log in within {window_minutes} minutes:\n\n\
                 {link}\n"
            );
            Ok(Delivery::Mail(OutgoingMail {
                to: user.email.clone(),
                reply_to: None,
                subject: "Your login link".to_string(),
                body,
            }))
        }
    }
}

/// Login service.
///
/// Generic over its stores so tests can run it without a database.
pub struct LoginService<'a, U, M, S> {
    users: U,
    mailer: &'a M,
    sms: &'a S,
    clock: &'a dyn Clock,
    gate: PasscodeGate,
    base_url: &'a str,
}

impl<'a, U: UserStore, M: Mailer, S: SmsSender> LoginService<'a, U, M, S> {
    /// Create a login service. `base_url` prefixes magic links.
    pub const fn new(
        users: U,
        mailer: &'a M,
        sms: &'a S,
        clock: &'a dyn Clock,
        gate: PasscodeGate,
        base_url: &'a str,
    ) -> Self {
        Self {
            users,
            mailer,
            sms,
            clock,
            gate,
            base_url,
        }
    }

    /// Generate a fresh code for `login` and deliver it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLogin` if `login` is not an email or phone number.
    /// Returns `AuthError::NoPhone` if the user wants phone codes but has no number.
    /// Returns `AuthError::Delivery` if the code could not be sent.
    /// Returns `AuthError::MissingCode` if no code was generated for the route.
    /// Returns `AuthError::SaveFailed` or `AuthError::Repository` on storage failures.
    #[instrument(skip(self, login))]
    pub async fn request_code(&self, login: &str) -> Result<CodeRequest, AuthError> {
        let login = LoginIdentifier::parse(login)?;

        let Some(mut user) = self.users.find_by_login(&login).await? else {
            tracing::info!("Login code requested for unknown user");
            return Ok(CodeRequest::Unknown);
        };

        match user.passcode_route {
            PasscodeRoute::Email => user.magic_link = Some(generate_magic_link()),
            PasscodeRoute::Phone => {
                if user.phone.is_none() {
                    return Err(AuthError::NoPhone);
                }
                user.phone_code = Some(generate_phone_code());
            }
        }
        user.login_attempts = user.login_attempts.saturating_add(1);
        user.login_date = Some(self.clock.now());

        if !self.users.save_login_details(&user).await? {
            return Err(AuthError::SaveFailed);
        }

        self.deliver(&user).await?;

        tracing::info!(
            user_id = %user.id,
            route = %user.passcode_route,
            attempts = user.login_attempts,
            "Login code sent"
        );
        Ok(CodeRequest::Sent(user.passcode_route))
    }

    async fn deliver(&self, user: &User) -> Result<(), AuthError> {
        match plan_delivery(user, self.base_url, self.gate.window_minutes())? {
            Delivery::Sms { to, body } => self.sms.send(&to, &body).await?,
            Delivery::Mail(mail) => self.mailer.send(&mail).await?,
        }
        Ok(())
    }

    /// Log in with a magic link token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCode` if no user holds the token.
    /// Returns `AuthError::Expired` if the token is outside the passcode window.
    #[instrument(skip(self, token))]
    pub async fn redeem_magic_link(&self, token: &str) -> Result<User, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidCode);
        }

        let user = self
            .users
            .find_by_magic_link(token)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        if !self.gate.check(user.login_date, self.clock.now()) {
            tracing::info!(user_id = %user.id, "Expired magic link");
            return Err(AuthError::Expired);
        }

        Ok(user)
    }

    /// Log in with a phone code.
    ///
    /// Expiry is checked before the code itself, so a stale code is rejected
    /// even when it matches.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLogin` if `login` cannot be parsed.
    /// Returns `AuthError::Expired` if the code is outside the passcode window.
    /// Returns `AuthError::InvalidCode` if the user is unknown or the code does not match.
    #[instrument(skip(self, login, code))]
    pub async fn redeem_phone_code(&self, login: &str, code: &str) -> Result<User, AuthError> {
        let login = LoginIdentifier::parse(login)?;

        let user = self
            .users
            .find_by_login(&login)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        if !self.gate.check(user.login_date, self.clock.now()) {
            tracing::info!(user_id = %user.id, "Expired phone code");
            return Err(AuthError::Expired);
        }

        let stored = user.phone_code.as_deref().ok_or(AuthError::InvalidCode)?;
        if !constant_time_compare(stored, code.trim()) {
            return Err(AuthError::InvalidCode);
        }

        Ok(user)
    }
}
