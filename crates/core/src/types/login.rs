//! Passwordless login types.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};
use super::phone::{PhoneError, PhoneNumber};

/// How a user receives their one-time login passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "passcode_route", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PasscodeRoute {
    /// A magic link sent by email.
    #[default]
    Email,
    /// A short numeric code sent by SMS.
    Phone,
}

impl fmt::Display for PasscodeRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Phone => f.write_str("phone"),
        }
    }
}

impl std::str::FromStr for PasscodeRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            _ => Err(format!("invalid passcode route: {s}")),
        }
    }
}

/// Errors parsing a [`LoginIdentifier`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifierError {
    /// Looked like an email address but failed validation.
    #[error(transparent)]
    Email(#[from] EmailError),
    /// Looked like a phone number but failed validation.
    #[error(transparent)]
    Phone(#[from] PhoneError),
}

/// The value a user types into the single "login" field.
///
/// Anything containing `@` is treated as an email address, everything else
/// as a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoginIdentifier {
    /// Login by email address.
    Email(Email),
    /// Login by phone number.
    Phone(PhoneNumber),
}

impl LoginIdentifier {
    /// Parse the login field.
    ///
    /// # Errors
    ///
    /// Returns the validation error of whichever kind the input looked like.
    pub fn parse(s: &str) -> Result<Self, LoginIdentifierError> {
        if s.contains('@') {
            Ok(Self::Email(Email::parse(s)?))
        } else {
            Ok(Self::Phone(PhoneNumber::parse(s)?))
        }
    }

    /// The normalized value as stored in the database.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(email) => email.as_str(),
            Self::Phone(phone) => phone.as_str(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_identifier_detects_kind() {
        assert!(matches!(
            LoginIdentifier::parse("Me@Example.com").unwrap(),
            LoginIdentifier::Email(_)
        ));
        assert!(matches!(
            LoginIdentifier::parse("+31 6 1234 5678").unwrap(),
            LoginIdentifier::Phone(_)
        ));
    }

    #[test]
    fn test_login_identifier_reports_kind_specific_errors() {
        assert!(matches!(
            LoginIdentifier::parse("me@nowhere"),
            Err(LoginIdentifierError::Email(_))
        ));
        assert!(matches!(
            LoginIdentifier::parse("me"),
            Err(LoginIdentifierError::Phone(_))
        ));
    }

    #[test]
    fn test_passcode_route_round_trips_through_str() {
        for route in [PasscodeRoute::Email, PasscodeRoute::Phone] {
            assert_eq!(route.to_string().parse::<PasscodeRoute>().unwrap(), route);
        }
        assert!("pigeon".parse::<PasscodeRoute>().is_err());
    }
}
