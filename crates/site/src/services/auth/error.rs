//! Authentication error types.

use thiserror::Error;

use folio_core::LoginIdentifierError;

use crate::db::RepositoryError;
use crate::services::mail::DeliveryError;

/// Errors that can occur during passwordless login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login is neither a valid email nor a valid phone number.
    #[error("invalid login: {0}")]
    InvalidLogin(#[from] LoginIdentifierError),

    /// Magic link or phone code does not match.
    #[error("invalid code")]
    InvalidCode,

    /// The code is older than the passcode window.
    #[error("code expired")]
    Expired,

    /// The user has no phone number for a phone code.
    #[error("no phone number on file")]
    NoPhone,

    /// The code could not be delivered.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// No code was generated for the user's route.
    #[error("no login code to deliver")]
    MissingCode,

    /// The user disappeared between lookup and update.
    #[error("failed to save login details")]
    SaveFailed,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
