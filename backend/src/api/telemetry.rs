//! Telemetry API handlers.

use axum::{extract::State, http::StatusCode, Json};
use devdiag_types::api::{
    AckResponse, ErrorResponse, LogApplicationEventRequest, ReportProfilesResponse,
    SetReportProfileStatusRequest,
};
use devdiag_types::{DiagEvent, ReportProfile};
use tracing::error;

use super::{error, ApiError, ValidatedJson};
use crate::state::AppState;
use crate::telemetry::TelemetryError;

impl TelemetryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::UnknownProfile(_) => StatusCode::NOT_FOUND,
            Self::Parameter { .. } | Self::Marker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TelemetryError> for ApiError {
    fn from(e: TelemetryError) -> Self {
        error(e.status_code(), e.to_string())
    }
}

/// List the telemetry report profiles available on the device.
#[utoipa::path(
    get,
    path = "/api/telemetry/report-profiles",
    tag = "telemetry",
    responses(
        (status = 200, description = "Available report profiles", body = ReportProfilesResponse)
    )
)]
pub async fn list_report_profiles(State(state): State<AppState>) -> Json<ReportProfilesResponse> {
    let report_profiles = state
        .telemetry()
        .available_profiles()
        .await
        .into_iter()
        .map(|name| ReportProfile { name })
        .collect();
    Json(ReportProfilesResponse { report_profiles })
}

/// Mark a report profile as started or complete.
#[utoipa::path(
    post,
    path = "/api/telemetry/report-profiles/status",
    tag = "telemetry",
    request_body = SetReportProfileStatusRequest,
    responses(
        (status = 200, description = "Status recorded", body = AckResponse),
        (status = 400, description = "Missing parameter or invalid status", body = ErrorResponse),
        (status = 404, description = "Unknown report profile", body = ErrorResponse),
        (status = 500, description = "Parameter store failure", body = ErrorResponse)
    )
)]
pub async fn set_report_profile_status(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SetReportProfileStatusRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let (Some(report_profile), Some(status)) = (req.report_profile, req.status) else {
        error!("No 'reportProfile' or 'status' parameter");
        return Err(error(
            StatusCode::BAD_REQUEST,
            "No 'reportProfile' or 'status' parameter",
        ));
    };

    let status = state
        .telemetry()
        .set_report_profile_status(&report_profile, &status)
        .await
        .map_err(|e| {
            error!("{}", e);
            ApiError::from(e)
        })?;

    state.events().broadcast(DiagEvent::ReportProfileStatusChanged {
        report_profile,
        status,
    });

    Ok(Json(AckResponse::default()))
}

/// Record an application telemetry event.
#[utoipa::path(
    post,
    path = "/api/telemetry/events",
    tag = "telemetry",
    request_body = LogApplicationEventRequest,
    responses(
        (status = 200, description = "Event logged", body = AckResponse),
        (status = 400, description = "Missing event name or value", body = ErrorResponse),
        (status = 500, description = "Marker log failure", body = ErrorResponse)
    )
)]
pub async fn log_application_event(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LogApplicationEventRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let (Some(event_name), Some(event_value)) = (req.event_name, req.event_value) else {
        error!("No 'eventName' or 'eventValue' parameter");
        return Err(error(
            StatusCode::BAD_REQUEST,
            "No 'eventName' or 'eventValue' parameter",
        ));
    };

    state
        .telemetry()
        .log_application_event(&event_name, &event_value)
        .await?;

    state.events().broadcast(DiagEvent::ApplicationEvent {
        event_name,
        event_value,
    });

    Ok(Json(AckResponse::default()))
}
