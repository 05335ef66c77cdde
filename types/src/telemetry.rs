//! Telemetry report profile and parameter types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A telemetry report profile available on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReportProfile {
    pub name: String,
}

/// Lifecycle status an application reports for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportProfileStatus {
    Started,
    Complete,
}

impl ReportProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Complete => "COMPLETE",
        }
    }

    /// Value written to the profile's `Report.Enable` parameter.
    ///
    /// Reporting is enabled once the application has completed its run.
    pub fn report_enable_value(&self) -> &'static str {
        match self {
            Self::Started => "false",
            Self::Complete => "true",
        }
    }
}

impl fmt::Display for ReportProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportProfileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTED" => Ok(Self::Started),
            "COMPLETE" => Ok(Self::Complete),
            other => Err(other.to_string()),
        }
    }
}

/// Type tag of a stored configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Int,
    Uint,
    Boolean,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Boolean => "boolean",
        };
        f.write_str(s)
    }
}

impl ParameterType {
    /// Check that `value` is a valid textual encoding for this type.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::String => true,
            Self::Int => value.parse::<i64>().is_ok(),
            Self::Uint => value.parse::<u64>().is_ok(),
            Self::Boolean => value == "true" || value == "false",
        }
    }
}
