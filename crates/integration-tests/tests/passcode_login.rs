//! Passwordless login flows against in-memory stores.

#![allow(clippy::unwrap_used)]

use chrono::Duration;

use folio_core::{Email, PasscodeRoute, UserId};
use folio_integration_tests::{FakeUsers, LogCapture, RecordingMailer, email_user, noon, phone_user};
use folio_site::clock::FixedClock;
use folio_site::services::{DisabledSms, LogMailer};
use folio_site::services::auth::{AuthError, CodeRequest, LoginService, PasscodeGate};

const BASE_URL: &str = "https://photos.test";

struct Harness {
    users: FakeUsers,
    mailer: RecordingMailer,
    sms: DisabledSms,
    clock: FixedClock,
}

impl Harness {
    fn new() -> Self {
        Self {
            users: FakeUsers::new(vec![
                email_user(1, "ana@example.com"),
                phone_user(2, "ben@example.com", "+44 20 7946 0018"),
            ]),
            mailer: RecordingMailer::default(),
            sms: DisabledSms,
            clock: FixedClock::new(noon(2026, 7, 1)),
        }
    }

    fn service(&self) -> LoginService<'_, FakeUsers, RecordingMailer, DisabledSms> {
        LoginService::new(
            self.users.clone(),
            &self.mailer,
            &self.sms,
            &self.clock,
            PasscodeGate::default(),
            BASE_URL,
        )
    }

    /// Give a phone user a known code issued `minutes_ago`.
    fn issue_phone_code(&self, code: &str, minutes_ago: i64) {
        let mut user = self.users.get(UserId::new(2)).unwrap();
        user.phone_code = Some(code.to_string());
        user.login_date = Some(noon(2026, 7, 1) - Duration::minutes(minutes_ago));
        self.users.put(user);
    }
}

#[tokio::test]
async fn test_magic_link_recoverable_from_log_mailer() {
    let capture = LogCapture::default();
    let _guard = capture.install();

    let users = FakeUsers::new(vec![email_user(1, "ana@example.com")]);
    let mailer = LogMailer::new(Email::parse("noreply@photos.test").unwrap());
    let sms = DisabledSms;
    let clock = FixedClock::new(noon(2026, 7, 1));
    let service = LoginService::new(
        users.clone(),
        &mailer,
        &sms,
        &clock,
        PasscodeGate::default(),
        BASE_URL,
    );

    service.request_code("ana@example.com").await.unwrap();

    let stored = users.get(UserId::new(1)).unwrap().magic_link.unwrap();
    let output = capture.text();
    let (_, after) = output.split_once("/auth/magic/").unwrap();
    let token: String = after
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    assert_eq!(token, stored);

    let user = service.redeem_magic_link(&token).await.unwrap();
    assert_eq!(user.id, UserId::new(1));
}

#[tokio::test]
async fn test_magic_link_round_trip() {
    let harness = Harness::new();
    let service = harness.service();

    let result = service.request_code("ana@example.com").await.unwrap();
    assert_eq!(result, CodeRequest::Sent(PasscodeRoute::Email));

    let stored = harness.users.get(UserId::new(1)).unwrap();
    let token = stored.magic_link.clone().unwrap();
    assert_eq!(stored.login_date, Some(noon(2026, 7, 1)));

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "ana@example.com");
    assert!(
        sent[0]
            .body
            .contains(&format!("{BASE_URL}/auth/magic/{token}"))
    );

    harness.clock.advance(Duration::minutes(14));
    let user = service.redeem_magic_link(&token).await.unwrap();
    assert_eq!(user.id, UserId::new(1));
}

#[tokio::test]
async fn test_magic_link_expires_at_fifteen_minutes() {
    let harness = Harness::new();
    let service = harness.service();

    service.request_code("ana@example.com").await.unwrap();
    let token = harness
        .users
        .get(UserId::new(1))
        .unwrap()
        .magic_link
        .unwrap();

    harness.clock.advance(Duration::minutes(15));
    let result = service.redeem_magic_link(&token).await;
    assert!(matches!(result, Err(AuthError::Expired)));
}

#[tokio::test]
async fn test_unknown_magic_link_is_rejected() {
    let harness = Harness::new();
    let service = harness.service();

    assert!(matches!(
        service.redeem_magic_link("doesnotexist").await,
        Err(AuthError::InvalidCode)
    ));
    assert!(matches!(
        service.redeem_magic_link("   ").await,
        Err(AuthError::InvalidCode)
    ));
}

#[tokio::test]
async fn test_each_request_counts_an_attempt() {
    let harness = Harness::new();
    let service = harness.service();

    service.request_code("ana@example.com").await.unwrap();
    let first = harness.users.get(UserId::new(1)).unwrap();
    service.request_code("ana@example.com").await.unwrap();
    let second = harness.users.get(UserId::new(1)).unwrap();

    assert_eq!(first.login_attempts, 1);
    assert_eq!(second.login_attempts, 2);
    assert_ne!(first.magic_link, second.magic_link);
}

#[tokio::test]
async fn test_unknown_login_is_not_an_error() {
    let harness = Harness::new();
    let service = harness.service();

    let result = service.request_code("nobody@example.com").await.unwrap();
    assert_eq!(result, CodeRequest::Unknown);
    assert!(harness.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_login_is_rejected() {
    let harness = Harness::new();
    let service = harness.service();

    assert!(matches!(
        service.request_code("not a login").await,
        Err(AuthError::InvalidLogin(_))
    ));
}

#[tokio::test]
async fn test_phone_code_delivery_fails_without_provider() {
    let harness = Harness::new();
    let service = harness.service();

    let result = service.request_code("+44 20 7946 0018").await;
    assert!(matches!(result, Err(AuthError::Delivery(_))));

    // The code is stored before delivery is attempted.
    let stored = harness.users.get(UserId::new(2)).unwrap();
    assert!(stored.phone_code.is_some());
    assert_eq!(stored.login_attempts, 1);
}

#[tokio::test]
async fn test_phone_code_accepted_inside_window() {
    let harness = Harness::new();
    harness.issue_phone_code("482913", 14);

    let user = harness
        .service()
        .redeem_phone_code("+442079460018", "482913")
        .await
        .unwrap();
    assert_eq!(user.id, UserId::new(2));
}

#[tokio::test]
async fn test_correct_phone_code_rejected_once_expired() {
    let harness = Harness::new();
    harness.issue_phone_code("482913", 15);

    let result = harness
        .service()
        .redeem_phone_code("+442079460018", "482913")
        .await;
    assert!(matches!(result, Err(AuthError::Expired)));
}

#[tokio::test]
async fn test_wrong_phone_code_rejected() {
    let harness = Harness::new();
    harness.issue_phone_code("482913", 1);

    let result = harness
        .service()
        .redeem_phone_code("+442079460018", "482914")
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));
}

#[tokio::test]
async fn test_phone_code_for_unknown_number_rejected() {
    let harness = Harness::new();

    let result = harness
        .service()
        .redeem_phone_code("+1 555 010 9999", "482913")
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));
}

#[test]
fn test_gate_boundary() {
    let gate = PasscodeGate::default();
    let issued = noon(2026, 7, 1);

    assert!(!gate.check(Some(issued), issued + Duration::minutes(15)));
    assert!(gate.check(Some(issued), issued + Duration::seconds(14 * 60 + 59)));
    assert!(!gate.check(None, issued));
}
