//! # Studyhall Server
//!
//! HTTP API for the Studyhall student social platform: the post feed,
//! two-level comment threads, likes and bookmarks, all paginated with
//! opaque cursors.
//!
//! Identity comes from the auth gateway in front of this service through the
//! `x-user-id` / `x-user-role` headers.

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{USER_ID_HEADER, USER_ROLE_HEADER};

/// Full application router with CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(&state);

    Router::new()
        .merge(routes::create_api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

// Permissive in dev, allow-list otherwise
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = &state.config().cors;
    if state.config().dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    if cors.allow_credentials && !cors.allowed_origins.is_empty() {
        layer = layer.allow_credentials(true);
    }

    layer
}
