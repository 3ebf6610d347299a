//! Stateless captcha proofs.
//!
//! A proof is `hex(HMAC-SHA256(server_secret, "YYYY-MM-DD:icon_id"))`. The
//! server never stores it: verification re-derives the proof for today's
//! date and the icon the visitor picked. Proofs from an earlier day never
//! match, so every outstanding challenge expires at UTC midnight.

use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use folio_core::IconId;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies captcha proofs with the server secret.
#[derive(Clone)]
pub struct ProofSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for ProofSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// The server secret could not be used as an HMAC key.
#[derive(Debug, thiserror::Error)]
#[error("invalid captcha signing key")]
pub struct InvalidSigningKey;

impl ProofSigner {
    /// Create a signer keyed with the server secret.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSigningKey` if the key is rejected by the HMAC implementation.
    pub fn new(secret: &SecretString) -> Result<Self, InvalidSigningKey> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| InvalidSigningKey)?;
        Ok(Self { mac })
    }

    fn keyed(&self, date: NaiveDate, icon_id: IconId) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(format!("{}:{icon_id}", date.format("%Y-%m-%d")).as_bytes());
        mac
    }

    /// Proof that `icon_id` was the expected answer on `date`.
    #[must_use]
    pub fn sign(&self, date: NaiveDate, icon_id: IconId) -> String {
        hex::encode(self.keyed(date, icon_id).finalize().into_bytes())
    }

    /// Check a claimed answer against a claimed proof for `date`.
    ///
    /// Missing inputs, anything but lowercase hex, and mismatches all return
    /// `false`. The digest comparison is constant-time.
    #[must_use]
    pub fn verify(&self, date: NaiveDate, icon_id: Option<IconId>, proof: Option<&str>) -> bool {
        let (Some(icon_id), Some(proof)) = (icon_id, proof) else {
            return false;
        };

        if !proof.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return false;
        }
        let Ok(digest) = hex::decode(proof) else {
            return false;
        };

        self.keyed(date, icon_id).verify_slice(&digest).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> ProofSigner {
        ProofSigner::new(&SecretString::from(secret)).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = signer("k3#Lp9@xQ2!mZ7$v");
        assert_eq!(
            signer.sign(day(4), IconId::new(12)),
            signer.sign(day(4), IconId::new(12))
        );
        assert_eq!(signer.sign(day(4), IconId::new(12)).len(), 64);
    }

    #[test]
    fn test_sign_depends_on_every_input() {
        let a = signer("k3#Lp9@xQ2!mZ7$v");
        let b = signer("another-Secret-9f8e7d");
        let base = a.sign(day(4), IconId::new(12));

        assert_ne!(base, a.sign(day(5), IconId::new(12)));
        assert_ne!(base, a.sign(day(4), IconId::new(13)));
        assert_ne!(base, b.sign(day(4), IconId::new(12)));
    }

    #[test]
    fn test_verify_round_trip() {
        let signer = signer("k3#Lp9@xQ2!mZ7$v");
        let proof = signer.sign(day(4), IconId::new(7));
        assert!(signer.verify(day(4), Some(IconId::new(7)), Some(&proof)));
    }

    #[test]
    fn test_verify_rejects_missing_inputs() {
        let signer = signer("k3#Lp9@xQ2!mZ7$v");
        let proof = signer.sign(day(4), IconId::new(7));
        assert!(!signer.verify(day(4), None, Some(&proof)));
        assert!(!signer.verify(day(4), Some(IconId::new(7)), None));
        assert!(!signer.verify(day(4), None, None));
    }

    #[test]
    fn test_verify_rejects_malformed_proofs() {
        let signer = signer("k3#Lp9@xQ2!mZ7$v");
        let proof = signer.sign(day(4), IconId::new(7));
        let id = Some(IconId::new(7));

        assert!(!signer.verify(day(4), id, Some("")));
        assert!(!signer.verify(day(4), id, Some("not hex at all")));
        assert!(!signer.verify(day(4), id, Some(&proof.to_uppercase())));
        assert!(!signer.verify(day(4), id, Some(&proof[..62])));
        assert!(!signer.verify(day(4), id, Some(&format!(" {proof}"))));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", signer("k3#Lp9@xQ2!mZ7$v"));
        assert!(!rendered.contains("k3#Lp9"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
