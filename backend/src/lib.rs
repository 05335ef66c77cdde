//! Device diagnostics backend library.
//!
//! This module exposes the application builder for use in tests.

use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod config;
pub mod decoder_feed;
pub mod decoder_registry;
pub mod events;
pub mod hostif;
pub mod openapi;
pub mod paths;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod version;

use state::AppState;

/// Create the Axum application router with a given state.
///
/// Any origin is allowed to call the API.
pub fn create_app(state: AppState) -> Router {
    create_app_with_cors(state, Vec::new())
}

/// Create the Axum application router with a given state and CORS origins.
///
/// If `cors_allowed_origins` is empty, any origin is allowed.
/// Otherwise, only the specified origins are allowed.
pub fn create_app_with_cors(state: AppState, cors_allowed_origins: Vec<String>) -> Router {
    let api_router = Router::new()
        // Decoder status
        .route(
            "/diagnostics/decoders/{kind}/status",
            get(api::diagnostics::get_decoder_status),
        )
        .route(
            "/diagnostics/decoders/{kind}",
            get(api::diagnostics::list_decoders),
        )
        .route(
            "/diagnostics/decoders/events",
            post(api::diagnostics::ingest_decoder_event),
        )
        .route(
            "/diagnostics/video-decoder-status",
            get(api::diagnostics::get_video_decoder_status),
        )
        .route(
            "/diagnostics/audio-decoder-status",
            get(api::diagnostics::get_audio_decoder_status),
        )
        // Device configuration
        .route(
            "/diagnostics/configuration",
            post(api::diagnostics::get_configuration),
        )
        // Telemetry
        .route(
            "/telemetry/report-profiles",
            get(api::telemetry::list_report_profiles),
        )
        .route(
            "/telemetry/report-profiles/status",
            post(api::telemetry::set_report_profile_status),
        )
        .route(
            "/telemetry/events",
            post(api::telemetry::log_application_event),
        )
        .route("/events", get(api::sse::events_stream))
        .route("/version", get(api::version::get_version));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
    let cors = if cors_allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    };

    Router::new()
        .route("/health", get(health))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .nest("/api", api_router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}
