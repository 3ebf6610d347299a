//! Captcha issue and verification with an injected clock.

#![allow(clippy::unwrap_used)]

use chrono::Duration;

use folio_core::IconId;
use folio_integration_tests::{FakeIcons, icons, noon, test_signer};
use folio_site::captcha::{CaptchaError, CaptchaService, MAX_ICONS, MIN_ICONS};
use folio_site::clock::FixedClock;

#[tokio::test]
async fn test_issued_challenge_verifies_the_same_day() {
    let signer = test_signer();
    let clock = FixedClock::new(noon(2026, 5, 4));

    for size in MIN_ICONS..=MAX_ICONS {
        let service = CaptchaService::new(FakeIcons::new(icons(size)), &signer, &clock);
        let challenge = service.issue(size).await.unwrap();

        assert_eq!(challenge.icons.len(), size);
        assert!(challenge.icons.contains(&challenge.selected));
        assert!(service.verify(Some(challenge.selected.icon_id), Some(&challenge.proof)));
    }
}

#[tokio::test]
async fn test_proof_still_verifies_later_the_same_day() {
    let signer = test_signer();
    let clock = FixedClock::new(noon(2026, 5, 4));
    let service = CaptchaService::new(FakeIcons::new(icons(5)), &signer, &clock);

    let challenge = service.issue(5).await.unwrap();
    clock.advance(Duration::hours(11) + Duration::minutes(59));

    assert!(service.verify(Some(challenge.selected.icon_id), Some(&challenge.proof)));
}

#[tokio::test]
async fn test_yesterdays_proof_fails_today() {
    let signer = test_signer();
    let clock = FixedClock::new(noon(2026, 5, 4));
    let service = CaptchaService::new(FakeIcons::new(icons(5)), &signer, &clock);

    let challenge = service.issue(5).await.unwrap();
    clock.advance(Duration::days(1));

    assert!(!service.verify(Some(challenge.selected.icon_id), Some(&challenge.proof)));
}

#[tokio::test]
async fn test_missing_or_mismatched_answers_fail() {
    let signer = test_signer();
    let clock = FixedClock::new(noon(2026, 5, 4));
    let service = CaptchaService::new(FakeIcons::new(icons(5)), &signer, &clock);

    let challenge = service.issue(5).await.unwrap();
    let selected = challenge.selected.icon_id;
    let other = challenge
        .icons
        .iter()
        .map(|icon| icon.icon_id)
        .find(|id| *id != selected)
        .unwrap();

    assert!(!service.verify(None, Some(&challenge.proof)));
    assert!(!service.verify(Some(selected), None));
    assert!(!service.verify(None, None));
    assert!(!service.verify(Some(other), Some(&challenge.proof)));
    assert!(!service.verify(Some(IconId::new(999)), Some(&challenge.proof)));
    assert!(!service.verify(Some(selected), Some("not-a-proof")));
}

#[tokio::test]
async fn test_proof_from_another_server_secret_fails() {
    let signer = test_signer();
    let other_signer = folio_site::captcha::ProofSigner::new(&secrecy::SecretString::from(
        "Zt5#pQ1!mW8^rK3@vB6&yH2x",
    ))
    .unwrap();
    let clock = FixedClock::new(noon(2026, 5, 4));

    let issuer = CaptchaService::new(FakeIcons::new(icons(5)), &other_signer, &clock);
    let challenge = issuer.issue(5).await.unwrap();

    let verifier = CaptchaService::new(FakeIcons::new(icons(5)), &signer, &clock);
    assert!(!verifier.verify(Some(challenge.selected.icon_id), Some(&challenge.proof)));
}

#[tokio::test]
async fn test_too_few_icons_is_an_error() {
    let signer = test_signer();
    let clock = FixedClock::new(noon(2026, 5, 4));
    let service = CaptchaService::new(FakeIcons::new(icons(2)), &signer, &clock);

    let result = service.issue(5).await;
    assert!(matches!(
        result,
        Err(CaptchaError::NotEnoughIcons { wanted: 3, got: 2 })
    ));
}

#[tokio::test]
async fn test_quantity_is_clamped() {
    let signer = test_signer();
    let clock = FixedClock::new(noon(2026, 5, 4));
    let store = FakeIcons::new(icons(20));
    let service = CaptchaService::new(store.clone(), &signer, &clock);

    assert_eq!(service.issue(0).await.unwrap().icons.len(), MIN_ICONS);
    assert_eq!(service.issue(100).await.unwrap().icons.len(), MAX_ICONS);
    assert_eq!(store.requested(), vec![MIN_ICONS, MAX_ICONS]);
}
