//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One router per binary. Each gets the same CORS policy (a single configured
//! origin with credentials) and a `TraceLayer` for request logging.

pub mod auth;
pub mod chat;
pub mod profile;
pub mod styles;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, ChatState};

/// CORS for the browser front end. Credentials rule out wildcards, so the
/// origin, methods and headers are listed explicitly.
#[must_use]
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Auth service: registration, login, sessions and blob profiles.
pub fn auth_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.clone());

    Router::new()
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login))
        .route("/api/users/logout", post(auth::logout))
        .route("/api/users/me", get(auth::me))
        .route(
            "/api/style-profile/{user_id}",
            get(profile::get_profile).post(profile::set_profile),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Style service: slot profiles, plus listing and debug routes when enabled.
pub fn style_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.clone());

    let mut router = Router::new()
        .route("/", get(styles::banner))
        .route(
            "/api/users/{user_id}/styles",
            get(styles::get_styles).post(styles::set_styles),
        )
        .route("/api/users/{user_id}/styles/{style_name}", patch(styles::update_style));

    if state.config.debug_routes {
        tracing::warn!("debug routes enabled");
        router = router
            .route("/api/styles/all", get(styles::list_all))
            .route("/api/debug/raw-profile/{user_id}", get(styles::raw_profile))
            .route("/api/debug/tables", get(styles::tables))
            .route("/api/debug/connection", get(styles::connection));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Chat service: the relay and a health probe.
pub fn chat_app(state: ChatState, cors_origin: HeaderValue) -> Router {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/health", get(chat::health))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
