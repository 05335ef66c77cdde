//! Telemetry report profiles and application event logging.

mod markers;
mod profiles;

pub use markers::{MarkerLog, MarkerSink};
pub use profiles::{ProfileCatalog, DEFAULT_PERSISTENT_DIR, DEFAULT_PROFILES_FILE};

use crate::storage::{ParameterStore, StorageError};
use devdiag_types::{ParameterType, ReportProfileStatus};
use std::sync::Arc;
use tracing::{error, info};

/// Caller id recorded with every parameter this service writes.
pub const RFC_CALLER_ID: &str = "Telemetry";

/// Prefix of the per-profile report enable parameter.
pub const RFC_REPORT_PROFILE_ENABLE: &str = "Device.DeviceInfo.X_RDKCENTRAL-COM_RFC.Feature.Telemetry.";

/// Name of the parameter that enables reporting for `profile`.
pub fn report_enable_parameter(profile: &str) -> String {
    format!("{}{}Report.Enable", RFC_REPORT_PROFILE_ENABLE, profile)
}

/// Error type for telemetry operations.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Only the 'STARTED' or 'COMPLETE' status is allowed")]
    InvalidStatus(String),

    #[error("Didn't find {0} in the list of available profiles")]
    UnknownProfile(String),

    #[error("Failed to set {parameter}: {source}")]
    Parameter {
        parameter: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to log telemetry event: {0}")]
    Marker(#[from] std::io::Error),
}

/// Telemetry operations over a profile catalog, parameter store and marker log.
#[derive(Clone)]
pub struct TelemetryService {
    catalog: ProfileCatalog,
    parameters: Arc<dyn ParameterStore>,
    markers: Arc<dyn MarkerSink>,
}

impl TelemetryService {
    pub fn new(
        catalog: ProfileCatalog,
        parameters: Arc<dyn ParameterStore>,
        markers: Arc<dyn MarkerSink>,
    ) -> Self {
        Self {
            catalog,
            parameters,
            markers,
        }
    }

    pub fn parameters(&self) -> &Arc<dyn ParameterStore> {
        &self.parameters
    }

    /// Names of all available report profiles.
    pub async fn available_profiles(&self) -> Vec<String> {
        self.catalog.available_profiles().await
    }

    /// Record that an application started or completed `profile`.
    ///
    /// `status` must be exactly `STARTED` or `COMPLETE`, and the profile must
    /// be available. Completing a profile enables its report.
    pub async fn set_report_profile_status(
        &self,
        profile: &str,
        status: &str,
    ) -> Result<ReportProfileStatus, TelemetryError> {
        let status: ReportProfileStatus = status
            .parse()
            .map_err(TelemetryError::InvalidStatus)?;

        if !self.catalog.contains(profile).await {
            return Err(TelemetryError::UnknownProfile(profile.to_string()));
        }

        let parameter = report_enable_parameter(profile);
        self.parameters
            .set_parameter(
                RFC_CALLER_ID,
                &parameter,
                status.report_enable_value(),
                ParameterType::Boolean,
            )
            .await
            .map_err(|source| {
                error!("Failed to set {}: {}", parameter, source);
                TelemetryError::Parameter {
                    parameter: parameter.clone(),
                    source,
                }
            })?;

        info!("Report profile '{}' marked {}", profile, status);
        Ok(status)
    }

    /// Forward an application event to the marker log.
    pub async fn log_application_event(
        &self,
        event_name: &str,
        event_value: &str,
    ) -> Result<(), TelemetryError> {
        self.markers.log_marker(event_name, event_value).await?;
        Ok(())
    }
}
