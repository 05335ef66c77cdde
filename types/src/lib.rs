//! Shared types for the device diagnostics service.
//!
//! This crate contains domain models and API types shared between
//! the service and its clients.

/// Default port for the diagnostics service.
pub const DEFAULT_PORT: u16 = 9998;

pub mod api;
pub mod decoder;
pub mod events;
pub mod telemetry;

// Re-export commonly used types
pub use decoder::{DecoderKind, DecoderStatus, DecoderStatusInfo};
pub use events::DiagEvent;
pub use telemetry::{ParameterType, ReportProfile, ReportProfileStatus};
