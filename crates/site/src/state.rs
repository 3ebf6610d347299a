//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::captcha::{InvalidSigningKey, ProofSigner};
use crate::clock::{Clock, SystemClock};
use crate::config::SiteConfig;
use crate::services::auth::PasscodeGate;
use crate::services::{DisabledSms, SiteMailer};

/// Errors that can occur while building application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The server secret cannot key the captcha signer.
    #[error(transparent)]
    SigningKey(#[from] InvalidSigningKey),

    /// The SMTP relay could not be set up.
    #[error("mailer setup failed: {0}")]
    Mailer(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Nothing in here changes after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    clock: Arc<dyn Clock>,
    signer: ProofSigner,
    mailer: SiteMailer,
    sms: DisabledSms,
}

impl AppState {
    /// Create application state using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the captcha signer or the mailer cannot be set up.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        Self::with_clock(config, pool, Arc::new(SystemClock))
    }

    /// Create application state with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the captcha signer or the mailer cannot be set up.
    pub fn with_clock(
        config: SiteConfig,
        pool: PgPool,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StateError> {
        let signer = ProofSigner::new(&config.server_secret)?;
        let mailer = SiteMailer::from_config(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                clock,
                signer,
                mailer,
                sms: DisabledSms,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Get the captcha proof signer.
    #[must_use]
    pub fn signer(&self) -> &ProofSigner {
        &self.inner.signer
    }

    /// Get the mailer.
    #[must_use]
    pub fn mailer(&self) -> &SiteMailer {
        &self.inner.mailer
    }

    /// Get the SMS sender.
    #[must_use]
    pub fn sms(&self) -> &DisabledSms {
        &self.inner.sms
    }

    /// Passcode gate built from the configured window.
    #[must_use]
    pub fn passcode_gate(&self) -> PasscodeGate {
        PasscodeGate::new(self.inner.config.passcode_window_minutes)
    }
}
