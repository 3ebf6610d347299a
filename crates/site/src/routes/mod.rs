//! HTTP route handlers for the site.
//!
//! Every handler returns JSON. The full route table is [`ROUTE_TABLE`];
//! `routes()` registers exactly these routes.

pub mod auth;
pub mod captcha;
pub mod contact;
pub mod favourites;
pub mod health;
pub mod photos;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    contact_rate_limiter, create_session_layer, login_rate_limiter, request_id_middleware,
};
use crate::state::AppState;

/// Every route served by the site, as `(method, path, description)`.
pub const ROUTE_TABLE: &[(&str, &str, &str)] = &[
    ("GET", "/health", "liveness"),
    ("GET", "/health/ready", "database readiness"),
    ("GET", "/albums", "album listing"),
    ("GET", "/photos", "photo search (?album=&q=)"),
    ("GET", "/photos/{id}", "photo detail, counts a view"),
    ("GET", "/photos/{id}/comments", "list comments"),
    ("POST", "/photos/{id}/comments", "add comment (login)"),
    ("GET", "/favourites", "list favourites (login)"),
    ("POST", "/favourites/{photo_id}", "add favourite (login)"),
    ("POST", "/favourites/{photo_id}/delete", "remove favourite (login)"),
    ("GET", "/captcha", "issue captcha challenge (?quantity=)"),
    ("POST", "/contact", "contact form"),
    ("POST", "/auth/login", "request magic link or phone code"),
    ("GET", "/auth/magic/{token}", "redeem magic link"),
    ("POST", "/auth/code", "redeem phone code"),
    ("POST", "/auth/logout", "logout"),
];

/// Create the login routes router, rate limited per client IP.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::request_code))
        .route("/magic/{token}", get(auth::redeem_magic_link))
        .route("/code", post(auth::redeem_code))
        .route("/logout", post(auth::logout))
        .layer(login_rate_limiter())
}

/// Create the contact form router, rate limited per client IP.
fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit))
        .layer(contact_rate_limiter())
}

/// Create the photo routes router.
fn photo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(photos::search))
        .route("/{id}", get(photos::show))
        .route(
            "/{id}/comments",
            get(photos::comments).post(photos::add_comment),
        )
}

/// Create the favourite routes router.
fn favourite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favourites::list))
        .route("/{photo_id}", post(favourites::add))
        .route("/{photo_id}/delete", post(favourites::remove))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/albums", get(photos::albums))
        .nest("/photos", photo_routes())
        .nest("/favourites", favourite_routes())
        .route("/captcha", get(captcha::issue))
        .merge(contact_routes())
        .nest("/auth", auth_routes())
}

/// Build the application: routes, sessions, request IDs, tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .merge(routes())
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
