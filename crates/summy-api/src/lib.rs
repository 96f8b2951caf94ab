//! HTTP front of the Summy broker.
//!
//! Page contexts outside the process open `GET /tabs/:tab_id/events` to
//! receive pushes and post protocol requests to `/tabs/:tab_id/messages`.
//! The settings page reads and writes `/settings`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod remote;
pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::events;
use crate::routes::{health, settings, tabs};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Settings page
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/settings/verify", post(settings::verify_settings))
        // Tabs
        .route("/tabs/:tab_id", delete(tabs::remove_tab))
        .route("/tabs/:tab_id/events", get(events::tab_events))
        .route("/tabs/:tab_id/messages", post(tabs::send_message))
        .route("/tabs/:tab_id/context-menu", post(tabs::context_menu));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    api_routes
        .layer(axum::middleware::from_fn(middleware::logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
