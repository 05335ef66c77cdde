//! OpenAPI documentation configuration.

use crate::version::VersionInfo;
use devdiag_types::api::{
    AckResponse, ConfigParameter, ConfigurationRequest, ConfigurationResponse,
    DecoderListResponse, DecoderStatusEvent, DecoderStatusResponse, ErrorResponse,
    LogApplicationEventRequest, ReportProfilesResponse, SetReportProfileStatusRequest,
};
use devdiag_types::{
    DecoderKind, DecoderStatus, DecoderStatusInfo, ReportProfile, ReportProfileStatus,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::diagnostics::get_decoder_status,
        crate::api::diagnostics::get_video_decoder_status,
        crate::api::diagnostics::get_audio_decoder_status,
        crate::api::diagnostics::list_decoders,
        crate::api::diagnostics::ingest_decoder_event,
        crate::api::diagnostics::get_configuration,
        crate::api::telemetry::list_report_profiles,
        crate::api::telemetry::set_report_profile_status,
        crate::api::telemetry::log_application_event,
        crate::api::version::get_version,
    ),
    components(
        schemas(
            DecoderKind,
            DecoderStatus,
            DecoderStatusInfo,
            DecoderStatusResponse,
            DecoderListResponse,
            DecoderStatusEvent,
            ConfigurationRequest,
            ConfigParameter,
            ConfigurationResponse,
            ReportProfile,
            ReportProfileStatus,
            ReportProfilesResponse,
            SetReportProfileStatusRequest,
            LogApplicationEventRequest,
            AckResponse,
            ErrorResponse,
            VersionInfo,
        )
    ),
    tags(
        (name = "diagnostics", description = "Decoder status and device configuration endpoints"),
        (name = "telemetry", description = "Report profile and application marker endpoints"),
        (name = "system", description = "System information endpoints")
    ),
    info(
        title = "Device Diagnostics API",
        version = "0.1.0",
        description = "REST API exposing decoder activity and telemetry controls of a set-top box",
        license(
            name = "MIT OR Apache-2.0"
        )
    )
)]
pub struct ApiDoc;
