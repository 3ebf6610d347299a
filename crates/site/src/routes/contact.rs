//! Contact form handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use folio_core::{Email, IconId};

use crate::captcha::CaptchaService;
use crate::db::IconRepository;
use crate::services::{Mailer, OutgoingMail};
use crate::state::AppState;

/// Longest accepted message, in characters.
const MAX_MESSAGE_LENGTH: usize = 5000;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub captcha_icon_id: Option<IconId>,
    #[serde(default)]
    pub captcha_proof: Option<String>,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn reply(
    status: StatusCode,
    success: bool,
    message: Option<&str>,
) -> (StatusCode, Json<ContactResponse>) {
    (
        status,
        Json(ContactResponse {
            success,
            message: message.map(str::to_string),
        }),
    )
}

/// Validate the form fields after the captcha has passed.
fn validate(form: &ContactForm) -> Result<(Email, &str, &str), &'static str> {
    let email = Email::parse(&form.email).map_err(|_| "Please enter a valid email address.")?;
    let name = form.name.trim();
    let message = form.message.trim();
    if name.is_empty() || message.is_empty() {
        return Err("Name and message are required.");
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message is too long.");
    }
    Ok((email, name, message))
}

/// Submit the contact form.
///
/// POST /contact
///
/// The captcha is checked before anything else.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> (StatusCode, Json<ContactResponse>) {
    let captcha = CaptchaService::new(
        IconRepository::new(state.pool()),
        state.signer(),
        state.clock(),
    );
    if !captcha.verify(form.captcha_icon_id, form.captcha_proof.as_deref()) {
        return reply(
            StatusCode::BAD_REQUEST,
            false,
            Some("Please pick the requested icon."),
        );
    }

    let (email, name, message) = match validate(&form) {
        Ok(fields) => fields,
        Err(msg) => return reply(StatusCode::BAD_REQUEST, false, Some(msg)),
    };

    let mail = OutgoingMail {
        to: state.config().contact_email.clone(),
        reply_to: Some(email.clone()),
        subject: format!("Contact form: {name}"),
        body: format!("From: {name} <{email}>\n\n{message}\n"),
    };

    match state.mailer().send(&mail).await {
        Ok(()) => {
            tracing::info!(from = %email, "Contact message sent");
            reply(StatusCode::OK, true, None)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send contact message");
            reply(
                StatusCode::BAD_GATEWAY,
                false,
                Some("Your message could not be sent, please try again later."),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            captcha_icon_id: None,
            captcha_proof: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let f = form(" Ana ", "Ana@Example.com", " Hi there ");
        let (email, name, message) = validate(&f).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(email.as_str(), "ana@example.com");
        assert_eq!(name, "Ana");
        assert_eq!(message, "Hi there");
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        assert!(validate(&form("Ana", "not-an-email", "Hi")).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(validate(&form("  ", "ana@example.com", "Hi")).is_err());
        assert!(validate(&form("Ana", "ana@example.com", "\n")).is_err());
    }

    #[test]
    fn test_validate_rejects_long_message() {
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate(&form("Ana", "ana@example.com", &long)).is_err());
    }
}
