//! Storage layer for device configuration parameters.
//!
//! Telemetry report profiles are switched on and off by writing typed
//! parameters, the same way the platform's RFC store is driven.

mod json_storage;

pub use json_storage::JsonParameterStore;

use async_trait::async_trait;
use devdiag_types::ParameterType;
use serde::{Deserialize, Serialize};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Parameter not found: {0}")]
    NotFound(String),

    #[error("Invalid {kind} value for {name}: '{value}'")]
    InvalidValue {
        name: String,
        value: String,
        kind: ParameterType,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored parameter value with its type tag and last writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredParameter {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub caller_id: String,
}

/// Trait for parameter storage backends.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Set a typed parameter on behalf of `caller_id`.
    async fn set_parameter(
        &self,
        caller_id: &str,
        name: &str,
        value: &str,
        kind: ParameterType,
    ) -> Result<()>;

    /// Read a parameter back.
    async fn get_parameter(&self, name: &str) -> Result<StoredParameter>;
}
