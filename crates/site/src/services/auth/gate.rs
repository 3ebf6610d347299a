//! Passcode expiry gate.
//!
//! A magic link or phone code is honoured only while fewer than
//! `window_minutes` whole minutes have passed since it was generated.
//! Every doubtful case (missing or unreadable date, clock going backwards)
//! counts as expired.

use chrono::{DateTime, Utc};

/// Default lifetime of a login code, in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// Whole minutes from `first` to `second`, seconds truncated.
///
/// Returns `None` if `second` is earlier than `first`.
#[must_use]
pub fn elapsed_minutes(first: DateTime<Utc>, second: DateTime<Utc>) -> Option<i64> {
    if second < first {
        return None;
    }
    Some((second - first).num_minutes())
}

/// Whether `second` falls strictly inside the window opened at `first`.
#[must_use]
pub fn within_window(first: DateTime<Utc>, second: DateTime<Utc>, window_minutes: i64) -> bool {
    elapsed_minutes(first, second).is_some_and(|elapsed| elapsed < window_minutes)
}

/// Parse a stored login date (RFC 3339). Unreadable input yields `None`.
#[must_use]
pub fn parse_login_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Expiry check applied before any login code is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasscodeGate {
    window_minutes: i64,
}

impl Default for PasscodeGate {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MINUTES)
    }
}

impl PasscodeGate {
    /// Create a gate with the given window.
    #[must_use]
    pub const fn new(window_minutes: i64) -> Self {
        Self { window_minutes }
    }

    /// The window length in minutes.
    #[must_use]
    pub const fn window_minutes(&self) -> i64 {
        self.window_minutes
    }

    /// Whether a code generated at `login_date` is still acceptable at `now`.
    #[must_use]
    pub fn check(&self, login_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        login_date.is_some_and(|first| within_window(first, now, self.window_minutes))
    }
}
