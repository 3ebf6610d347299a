//! Captcha challenge handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use folio_core::IconId;

use crate::captcha::{CaptchaChallenge, CaptchaService};
use crate::db::IconRepository;
use crate::error::Result;
use crate::state::AppState;

/// Icons shown when no quantity is requested.
const DEFAULT_QUANTITY: usize = 5;

/// Query parameters for a challenge.
#[derive(Debug, Default, Deserialize)]
pub struct CaptchaParams {
    pub quantity: Option<usize>,
}

/// An icon as shown to the visitor. The name is withheld.
#[derive(Debug, Serialize)]
pub struct IconView {
    pub icon_id: IconId,
    pub icon: String,
}

/// Challenge sent to the client.
///
/// Names the icon to pick but never its ID; the proof is returned with the
/// form alongside the picked icon's ID.
#[derive(Debug, Serialize)]
pub struct CaptchaResponse {
    pub icons: Vec<IconView>,
    pub prompt_name: String,
    pub prompt_colour: String,
    pub proof: String,
}

impl From<CaptchaChallenge> for CaptchaResponse {
    fn from(challenge: CaptchaChallenge) -> Self {
        Self {
            icons: challenge
                .icons
                .into_iter()
                .map(|icon| IconView {
                    icon_id: icon.icon_id,
                    icon: icon.icon,
                })
                .collect(),
            prompt_name: challenge.selected.name,
            prompt_colour: challenge.selected.colour,
            proof: challenge.proof,
        }
    }
}

/// GET /captcha?quantity=
#[instrument(skip(state))]
pub async fn issue(
    State(state): State<AppState>,
    Query(params): Query<CaptchaParams>,
) -> Result<Json<CaptchaResponse>> {
    let service = CaptchaService::new(
        IconRepository::new(state.pool()),
        state.signer(),
        state.clock(),
    );
    let challenge = service
        .issue(params.quantity.unwrap_or(DEFAULT_QUANTITY))
        .await?;
    Ok(Json(challenge.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::captcha::CaptchaIcon;

    use super::*;

    fn icon(id: i32, name: &str) -> CaptchaIcon {
        CaptchaIcon {
            icon_id: IconId::new(id),
            icon: format!("fa-{name}"),
            name: name.to_string(),
            colour: "red".to_string(),
        }
    }

    #[test]
    fn test_response_never_contains_selected_id_field() {
        let selected = icon(42, "anchor");
        let challenge = CaptchaChallenge {
            icons: vec![icon(7, "heart"), selected.clone(), icon(9, "star")],
            selected,
            proof: "ab12".to_string(),
        };

        let json = serde_json::to_value(CaptchaResponse::from(challenge)).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("selected"));
        assert_eq!(object["prompt_name"], "anchor");
        assert_eq!(object["icons"].as_array().unwrap().len(), 3);
        assert!(object["icons"][0].get("name").is_none());
    }
}
