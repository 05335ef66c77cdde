//! Events for real-time updates across clients.

use crate::decoder::{DecoderKind, DecoderStatus};
use crate::telemetry::ReportProfileStatus;
use serde::{Deserialize, Serialize};

/// Event types that can be broadcast to all connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DiagEvent {
    /// A pipeline reported a new status
    DecoderStatusChanged {
        kind: DecoderKind,
        #[serde(rename = "pipelineName")]
        pipeline_name: String,
        status: DecoderStatus,
    },
    /// The aggregate status of a decoder kind changed
    AggregateStatusChanged {
        kind: DecoderKind,
        status: DecoderStatus,
    },
    /// An application changed the status of a report profile
    ReportProfileStatusChanged {
        #[serde(rename = "reportProfile")]
        report_profile: String,
        status: ReportProfileStatus,
    },
    /// An application logged a telemetry marker
    ApplicationEvent {
        #[serde(rename = "eventName")]
        event_name: String,
        #[serde(rename = "eventValue")]
        event_value: String,
    },
}

impl DiagEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            Self::DecoderStatusChanged {
                kind,
                pipeline_name,
                status,
            } => format!("{} pipeline '{}' is now {}", kind, pipeline_name, status),
            Self::AggregateStatusChanged { kind, status } => {
                format!("{} decoders are now {}", kind, status)
            }
            Self::ReportProfileStatusChanged {
                report_profile,
                status,
            } => format!("Report profile '{}' {}", report_profile, status),
            Self::ApplicationEvent { event_name, .. } => {
                format!("Application event '{}'", event_name)
            }
        }
    }
}
