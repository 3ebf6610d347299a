//! Passwordless login handlers.
//!
//! `POST /auth/login` answers the same way whether or not the login belongs
//! to a user.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use folio_core::{Email, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::User;
use crate::services::auth::{CodeRequest, LoginService};
use crate::services::{DisabledSms, SiteMailer};
use crate::state::AppState;

/// Message returned for every accepted code request.
const CODE_REQUESTED: &str = "If an account exists for that login, a code is on its way.";

/// Code request form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub login: String,
}

/// Phone code redemption form.
#[derive(Debug, Deserialize)]
pub struct CodeForm {
    pub login: String,
    pub code: String,
}

/// Generic success response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// The user now logged in.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: UserId,
    pub email: Email,
    pub name: String,
}

fn login_service(
    state: &AppState,
) -> LoginService<'_, UserRepository<'_>, SiteMailer, DisabledSms> {
    LoginService::new(
        UserRepository::new(state.pool()),
        state.mailer(),
        state.sms(),
        state.clock(),
        state.passcode_gate(),
        &state.config().base_url,
    )
}

async fn start_session(session: &Session, user: &User) -> Result<Json<SessionResponse>> {
    set_current_user(session, user)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(SessionResponse {
        user_id: user.id,
        email: user.email.clone(),
        name: user.public_name().to_string(),
    }))
}

/// Request a magic link or phone code.
///
/// POST /auth/login
#[instrument(skip(state, form))]
pub async fn request_code(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<MessageResponse>> {
    match login_service(&state).request_code(&form.login).await? {
        CodeRequest::Sent(_) | CodeRequest::Unknown => Ok(Json(MessageResponse {
            success: true,
            message: CODE_REQUESTED,
        })),
    }
}

/// Redeem a magic link.
///
/// GET /auth/magic/{token}
#[instrument(skip(state, session, token))]
pub async fn redeem_magic_link(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<Json<SessionResponse>> {
    let user = login_service(&state).redeem_magic_link(&token).await?;
    start_session(&session, &user).await
}

/// Redeem a phone code.
///
/// POST /auth/code
#[instrument(skip(state, session, form))]
pub async fn redeem_code(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CodeForm>,
) -> Result<Json<SessionResponse>> {
    let user = login_service(&state)
        .redeem_phone_code(&form.login, &form.code)
        .await?;
    start_session(&session, &user).await
}

/// Log out.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out.",
    }))
}
