//! Decoder pipeline kinds and status definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Classification of a decode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    Video,
    Audio,
}

impl DecoderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecoderKind {
    type Err = ParseDecoderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(ParseDecoderKindError(other.to_string())),
        }
    }
}

/// Returned when a string does not name a decoder kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecoderKindError(pub String);

impl fmt::Display for ParseDecoderKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown decoder kind '{}'", self.0)
    }
}

impl std::error::Error for ParseDecoderKindError {}

/// Operational status reported for a decoder pipeline.
///
/// Variants are declared from least to most active so that the derived
/// ordering doubles as the aggregation priority: `Active > Paused > Idle`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum DecoderStatus {
    /// Nothing is being decoded
    #[default]
    Idle,
    /// Decoding is set up but halted
    Paused,
    /// Actively decoding
    Active,
}

impl DecoderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Idle => "IDLE",
        }
    }
}

impl fmt::Display for DecoderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the exact, case-sensitive status text sent by the platform.
impl FromStr for DecoderStatus {
    type Err = ParseDecoderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "PAUSED" => Ok(Self::Paused),
            "IDLE" => Ok(Self::Idle),
            other => Err(ParseDecoderStatusError(other.to_string())),
        }
    }
}

/// Returned when status text is not one of `ACTIVE`, `PAUSED` or `IDLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecoderStatusError(pub String);

impl fmt::Display for ParseDecoderStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized decoder status '{}'", self.0)
    }
}

impl std::error::Error for ParseDecoderStatusError {}

/// Latest known status of a single pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DecoderStatusInfo {
    pub pipeline_name: String,
    pub status: DecoderStatus,
}
