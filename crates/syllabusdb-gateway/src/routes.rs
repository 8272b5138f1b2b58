//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use syllabusdb_auth::IdTokenValidator;
use syllabusdb_moderation::Moderation;

use crate::handlers::{colleges, health, pending, scan, syllabi};
use crate::state::GatewayState;

const SYLLABUS_PATH: &str = "/v1/admin/colleges/{college}/courses/{course}/syllabi/{syllabus}";

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Admin (gated, failures redirect)
/// - `GET /v1/admin/pending` - Pending syllabi and college requests
/// - `POST /v1/admin/colleges/{college}/courses/{course}/syllabi/{syllabus}/approve`
/// - `POST /v1/admin/colleges/{college}/courses/{course}/syllabi/{syllabus}/disapprove`
/// - `POST /v1/admin/colleges/{college}/courses/{course}/syllabi/{syllabus}/scan`
/// - `POST /v1/admin/colleges/{college}/approve`
/// - `POST /v1/admin/colleges/{college}/disapprove`
/// - `GET /v1/admin/syllabi/{syllabus}/scan` - Latest scan result
pub fn create_router<M, V>(state: GatewayState<M, V>) -> Router
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Queue
        .route("/v1/admin/pending", get(pending::list_pending::<M, V>))
        // Syllabi
        .route(
            &format!("{SYLLABUS_PATH}/approve"),
            post(syllabi::approve_syllabus::<M, V>),
        )
        .route(
            &format!("{SYLLABUS_PATH}/disapprove"),
            post(syllabi::disapprove_syllabus::<M, V>),
        )
        .route(
            &format!("{SYLLABUS_PATH}/scan"),
            post(scan::request_scan::<M, V>),
        )
        .route(
            "/v1/admin/syllabi/{syllabus}/scan",
            get(scan::scan_result::<M, V>),
        )
        // College requests
        .route(
            "/v1/admin/colleges/{college}/approve",
            post(colleges::approve_college::<M, V>),
        )
        .route(
            "/v1/admin/colleges/{college}/disapprove",
            post(colleges::disapprove_college::<M, V>),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
