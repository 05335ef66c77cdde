//! Device diagnostics API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use devdiag_types::api::{
    AckResponse, ConfigurationRequest, ConfigurationResponse, DecoderListResponse,
    DecoderStatusEvent, DecoderStatusResponse, ErrorResponse,
};
use devdiag_types::DecoderKind;
use tracing::{debug, error};

use super::{error, error_with_details, ApiError, ValidatedJson};
use crate::state::AppState;

fn parse_kind(kind: &str) -> Result<DecoderKind, ApiError> {
    kind.parse()
        .map_err(|e| error_with_details(StatusCode::BAD_REQUEST, "Unknown decoder kind", e))
}

fn aggregate_status(state: &AppState, kind: DecoderKind) -> Json<DecoderStatusResponse> {
    Json(DecoderStatusResponse {
        decoder_status: state.decoders().most_active_status(kind),
    })
}

/// Get the most active status across all decoders of a kind.
#[utoipa::path(
    get,
    path = "/api/diagnostics/decoders/{kind}/status",
    tag = "diagnostics",
    params(
        ("kind" = String, Path, description = "Decoder kind: video or audio")
    ),
    responses(
        (status = 200, description = "Aggregate decoder status", body = DecoderStatusResponse),
        (status = 400, description = "Unknown decoder kind", body = ErrorResponse)
    )
)]
pub async fn get_decoder_status(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<DecoderStatusResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(aggregate_status(&state, kind))
}

/// Get the most active video decoder status.
#[utoipa::path(
    get,
    path = "/api/diagnostics/video-decoder-status",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Aggregate video decoder status", body = DecoderStatusResponse)
    )
)]
pub async fn get_video_decoder_status(
    State(state): State<AppState>,
) -> Json<DecoderStatusResponse> {
    aggregate_status(&state, DecoderKind::Video)
}

/// Get the most active audio decoder status.
#[utoipa::path(
    get,
    path = "/api/diagnostics/audio-decoder-status",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Aggregate audio decoder status", body = DecoderStatusResponse)
    )
)]
pub async fn get_audio_decoder_status(
    State(state): State<AppState>,
) -> Json<DecoderStatusResponse> {
    aggregate_status(&state, DecoderKind::Audio)
}

/// List every known pipeline of a decoder kind with its latest status.
#[utoipa::path(
    get,
    path = "/api/diagnostics/decoders/{kind}",
    tag = "diagnostics",
    params(
        ("kind" = String, Path, description = "Decoder kind: video or audio")
    ),
    responses(
        (status = 200, description = "Known pipelines", body = DecoderListResponse),
        (status = 400, description = "Unknown decoder kind", body = ErrorResponse)
    )
)]
pub async fn list_decoders(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<DecoderListResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(DecoderListResponse {
        kind,
        pipelines: state.decoders().pipelines(kind),
    }))
}

/// Submit a decoder status event from the platform event bus.
///
/// Events are applied asynchronously; unrecognized status values are
/// accepted here and dropped by the registry.
#[utoipa::path(
    post,
    path = "/api/diagnostics/decoders/events",
    tag = "diagnostics",
    request_body = DecoderStatusEvent,
    responses(
        (status = 202, description = "Event queued", body = AckResponse),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 503, description = "Event feed stopped", body = ErrorResponse)
    )
)]
pub async fn ingest_decoder_event(
    State(state): State<AppState>,
    ValidatedJson(event): ValidatedJson<DecoderStatusEvent>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    debug!(
        "Decoder event received: {} '{}' {}",
        event.kind, event.pipeline_name, event.status
    );

    state.decoder_feed().publish(event).await.map_err(|e| {
        error!("Failed to queue decoder event: {}", e);
        error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })?;

    Ok((StatusCode::ACCEPTED, Json(AckResponse::default())))
}

/// Read named device configuration parameters from the host interface.
#[utoipa::path(
    post,
    path = "/api/diagnostics/configuration",
    tag = "diagnostics",
    request_body = ConfigurationRequest,
    responses(
        (status = 200, description = "Parameter values", body = ConfigurationResponse),
        (status = 400, description = "No parameter names given", body = ErrorResponse),
        (status = 502, description = "Host interface failure", body = ErrorResponse)
    )
)]
pub async fn get_configuration(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ConfigurationRequest>,
) -> Result<Json<ConfigurationResponse>, ApiError> {
    match state.configuration().get_configuration(&req.names).await {
        Ok(param_list) => Ok(Json(ConfigurationResponse { param_list })),
        Err(e) => {
            error!("Configuration query failed: {}", e);
            Err(error_with_details(
                StatusCode::BAD_GATEWAY,
                "Failed to query device configuration",
                e,
            ))
        }
    }
}
