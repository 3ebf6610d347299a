//! Icon captcha for the contact form.
//!
//! The visitor is shown a handful of icons and asked to pick one by name.
//! The expected answer travels with the page as an HMAC proof (see
//! [`proof`]), so nothing is stored per challenge.

pub mod proof;

use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::instrument;

use folio_core::IconId;

pub use proof::{InvalidSigningKey, ProofSigner};

use crate::clock::Clock;
use crate::db::{IconStore, RepositoryError};

/// Fewest icons a challenge may show.
pub const MIN_ICONS: usize = 3;

/// Most icons a challenge may show.
pub const MAX_ICONS: usize = 12;

/// A captcha icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptchaIcon {
    pub icon_id: IconId,
    /// Markup or identifier rendered by the page (e.g. an icon font class).
    pub icon: String,
    pub name: String,
    pub colour: String,
}

/// An issued challenge. Only the proof and the prompt reach the client.
#[derive(Debug, Clone)]
pub struct CaptchaChallenge {
    /// Icons to display, in random order.
    pub icons: Vec<CaptchaIcon>,
    /// The icon the visitor has to pick.
    pub selected: CaptchaIcon,
    /// Proof for `selected`, round-tripped through the form.
    pub proof: String,
}

/// Errors issuing a challenge. Verification never fails with an error.
#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    /// The icon store returned too few icons to build a challenge.
    #[error("need at least {wanted} captcha icons, store returned {got}")]
    NotEnoughIcons { wanted: usize, got: usize },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Issues and verifies captcha challenges.
pub struct CaptchaService<'a, I> {
    icons: I,
    signer: &'a ProofSigner,
    clock: &'a dyn Clock,
}

impl<'a, I: IconStore> CaptchaService<'a, I> {
    /// Create a captcha service.
    pub const fn new(icons: I, signer: &'a ProofSigner, clock: &'a dyn Clock) -> Self {
        Self {
            icons,
            signer,
            clock,
        }
    }

    /// Issue a challenge showing `quantity` icons (clamped to
    /// [`MIN_ICONS`]..=[`MAX_ICONS`]).
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::NotEnoughIcons` if fewer than `MIN_ICONS` icons
    /// exist, or `CaptchaError::Repository` if the lookup fails.
    #[instrument(skip(self))]
    pub async fn issue(&self, quantity: usize) -> Result<CaptchaChallenge, CaptchaError> {
        let quantity = quantity.clamp(MIN_ICONS, MAX_ICONS);
        let icons = self.icons.random_icons(quantity).await?;

        if icons.len() < MIN_ICONS {
            return Err(CaptchaError::NotEnoughIcons {
                wanted: MIN_ICONS,
                got: icons.len(),
            });
        }

        let Some(selected) = icons.choose(&mut rand::rng()).cloned() else {
            return Err(CaptchaError::NotEnoughIcons {
                wanted: MIN_ICONS,
                got: 0,
            });
        };
        let proof = self.signer.sign(self.clock.today(), selected.icon_id);

        Ok(CaptchaChallenge {
            icons,
            selected,
            proof,
        })
    }

    /// Check the icon the visitor picked against the proof from the form.
    #[must_use]
    pub fn verify(&self, claimed_icon_id: Option<IconId>, claimed_proof: Option<&str>) -> bool {
        let verified = self
            .signer
            .verify(self.clock.today(), claimed_icon_id, claimed_proof);
        if !verified {
            tracing::debug!(icon_id = ?claimed_icon_id, "Captcha verification failed");
        }
        verified
    }
}
