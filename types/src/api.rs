//! API request and response types.

use crate::decoder::{DecoderKind, DecoderStatus, DecoderStatusInfo};
use crate::telemetry::ReportProfile;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// ============================================================================
// Decoder API Types
// ============================================================================

/// Aggregate status across all pipelines of one decoder kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DecoderStatusResponse {
    pub decoder_status: DecoderStatus,
}

/// Every known pipeline of one decoder kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DecoderListResponse {
    pub kind: DecoderKind,
    pub pipelines: Vec<DecoderStatusInfo>,
}

/// A status update for one pipeline, as delivered by the platform event bus.
///
/// `status` is kept as raw text; unrecognized values are dropped by the
/// registry rather than rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[cfg_attr(feature = "validation", derive(garde::Validate))]
#[serde(rename_all = "camelCase")]
pub struct DecoderStatusEvent {
    #[cfg_attr(feature = "validation", garde(skip))]
    pub kind: DecoderKind,
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub pipeline_name: String,
    #[cfg_attr(feature = "validation", garde(skip))]
    pub status: String,
}

impl DecoderStatusEvent {
    pub fn new(
        kind: DecoderKind,
        pipeline_name: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            pipeline_name: pipeline_name.into(),
            status: status.into(),
        }
    }
}

// ============================================================================
// Device Configuration API Types
// ============================================================================

/// Request for the current values of named device parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[cfg_attr(feature = "validation", derive(garde::Validate))]
pub struct ConfigurationRequest {
    #[cfg_attr(feature = "validation", garde(length(min = 1), inner(length(min = 1))))]
    pub names: Vec<String>,
}

/// A device parameter as reported by the host interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConfigParameter {
    pub name: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub value: serde_json::Value,
}

/// Parameter values returned by the host interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationResponse {
    pub param_list: Vec<ConfigParameter>,
}

// ============================================================================
// Telemetry API Types
// ============================================================================

/// Report profiles available on the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportProfilesResponse {
    pub report_profiles: Vec<ReportProfile>,
}

/// Request to mark a report profile as started or complete.
///
/// Both fields are optional on the wire so that a missing field produces a
/// descriptive error instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[cfg_attr(feature = "validation", derive(garde::Validate))]
#[serde(rename_all = "camelCase")]
pub struct SetReportProfileStatusRequest {
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub report_profile: Option<String>,
    #[cfg_attr(feature = "validation", garde(skip))]
    pub status: Option<String>,
}

/// Request to record an application telemetry marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[cfg_attr(feature = "validation", derive(garde::Validate))]
#[serde(rename_all = "camelCase")]
pub struct LogApplicationEventRequest {
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub event_name: Option<String>,
    #[cfg_attr(feature = "validation", garde(skip))]
    pub event_value: Option<String>,
}

/// Empty acknowledgement body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AckResponse {}

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
