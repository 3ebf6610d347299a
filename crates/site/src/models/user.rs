//! User domain type.

use chrono::{DateTime, Utc};

use folio_core::{Email, PasscodeRoute, PhoneNumber, UserId};

/// A site user, including the state of their passwordless login.
///
/// `magic_link` and `phone_code` are regenerated on every code request and
/// are only honoured while `login_date` is inside the passcode window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    pub display_name: String,
    pub passcode_route: PasscodeRoute,
    pub magic_link: Option<String>,
    pub phone_code: Option<String>,
    /// Number of codes generated for this user so far.
    pub login_attempts: i32,
    /// When the latest code was generated.
    pub login_date: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown next to comments; falls back to the email's local part.
    #[must_use]
    pub fn public_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            self.email
                .as_str()
                .split_once('@')
                .map_or("", |(local, _)| local)
        } else {
            self.display_name.trim()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(display_name: &str) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("wanderer@example.com").unwrap(),
            phone: None,
            display_name: display_name.to_string(),
            passcode_route: PasscodeRoute::Email,
            magic_link: None,
            phone_code: None,
            login_attempts: 0,
            login_date: None,
        }
    }

    #[test]
    fn test_public_name_prefers_display_name() {
        assert_eq!(user("  Ines ").public_name(), "Ines");
    }

    #[test]
    fn test_public_name_falls_back_to_email_local_part() {
        assert_eq!(user("").public_name(), "wanderer");
    }
}
