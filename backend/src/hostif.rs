//! Client for the local host-interface daemon.
//!
//! The daemon answers device parameter queries posted as
//! `{"paramList":[{"name":...}]}` with the same list filled in with values.

use async_trait::async_trait;
use devdiag_types::api::ConfigParameter;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default host-interface endpoint.
pub const DEFAULT_HOSTIF_URL: &str = "http://127.0.0.1:10999";

/// Default request timeout in seconds.
pub const DEFAULT_HOSTIF_TIMEOUT_SECS: u64 = 30;

/// Error type for host-interface queries.
#[derive(Debug, thiserror::Error)]
pub enum HostIfError {
    #[error("Host interface request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Host interface returned HTTP {0}")]
    Status(u16),
}

/// Source of device configuration parameter values.
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    async fn get_configuration(
        &self,
        names: &[String],
    ) -> Result<Vec<ConfigParameter>, HostIfError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParamListRequest<'a> {
    param_list: Vec<ParamName<'a>>,
}

#[derive(Serialize)]
struct ParamName<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParamListResponse {
    #[serde(default)]
    param_list: Vec<ConfigParameter>,
}

/// HTTP client for the host-interface daemon.
#[derive(Clone, Debug)]
pub struct HostIfClient {
    url: String,
    client: Client,
}

impl HostIfClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, HostIfError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ConfigurationSource for HostIfClient {
    async fn get_configuration(
        &self,
        names: &[String],
    ) -> Result<Vec<ConfigParameter>, HostIfError> {
        let request = ParamListRequest {
            param_list: names
                .iter()
                .map(|name| ParamName {
                    name: name.as_str(),
                })
                .collect(),
        };

        debug!("Querying {} parameters from {}", names.len(), self.url);
        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostIfError::Status(status.as_u16()));
        }

        let body: ParamListResponse = response.json().await?;
        Ok(body.param_list)
    }
}
