//! Configuration management.

use crate::decoder_feed::DEFAULT_FEED_CAPACITY;
use crate::hostif::{DEFAULT_HOSTIF_TIMEOUT_SECS, DEFAULT_HOSTIF_URL};
use crate::paths::{DataPaths, PathConfig};
use crate::telemetry::{DEFAULT_PERSISTENT_DIR, DEFAULT_PROFILES_FILE};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    diagnostics: DiagnosticsConfig,
    #[serde(default)]
    telemetry: TelemetryConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_port")]
    port: u16,
    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StorageConfig {
    data_dir: Option<PathBuf>,
    parameters_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiagnosticsConfig {
    /// Host-interface daemon endpoint used for configuration queries
    #[serde(default = "default_hostif_url")]
    hostif_url: String,
    #[serde(default = "default_hostif_timeout_secs")]
    hostif_timeout_secs: u64,
    /// Capacity of the decoder event feed
    #[serde(default = "default_event_buffer")]
    event_buffer: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            hostif_url: default_hostif_url(),
            hostif_timeout_secs: default_hostif_timeout_secs(),
            event_buffer: default_event_buffer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TelemetryConfig {
    #[serde(default = "default_profiles_file")]
    profiles_file: PathBuf,
    #[serde(default = "default_persistent_dir")]
    persistent_dir: PathBuf,
    /// JSON-lines file receiving application markers (optional)
    marker_log: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            profiles_file: default_profiles_file(),
            persistent_dir: default_persistent_dir(),
            marker_log: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Path to log file (if set, logs will be written to file in addition to stdout)
    log_file: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

fn default_port() -> u16 {
    devdiag_types::DEFAULT_PORT
}

fn default_hostif_url() -> String {
    DEFAULT_HOSTIF_URL.to_string()
}

fn default_hostif_timeout_secs() -> u64 {
    DEFAULT_HOSTIF_TIMEOUT_SECS
}

fn default_event_buffer() -> usize {
    DEFAULT_FEED_CAPACITY
}

fn default_profiles_file() -> PathBuf {
    PathBuf::from(DEFAULT_PROFILES_FILE)
}

fn default_persistent_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PERSISTENT_DIR)
}

/// Values given on the command line; `None` leaves lower layers in effect.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub hostif_url: Option<String>,
    pub profiles_file: Option<PathBuf>,
    pub persistent_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,
    /// Origins allowed by CORS; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
    /// Directory holding service data
    pub data_dir: PathBuf,
    /// Path to the parameter store file
    pub parameters_path: PathBuf,
    /// Host-interface daemon endpoint
    pub hostif_url: String,
    /// Timeout for host-interface requests
    pub hostif_timeout: Duration,
    /// Capacity of the decoder event feed
    pub event_buffer: usize,
    /// Default telemetry profile pack
    pub profiles_file: PathBuf,
    /// Folder of persisted telemetry profiles
    pub persistent_dir: PathBuf,
    /// JSON-lines file receiving application markers
    pub marker_log: Option<PathBuf>,
    /// Path to log file (if set, logs will be written to file in addition to stdout)
    pub log_file: Option<PathBuf>,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `config.toml` in user config directory (~/.config/devdiag/ on Linux)
    /// 2. `.devdiag.toml` in current directory
    /// 3. the file named by `--config`, if any
    ///
    /// Environment variables use the `DEVDIAG_` prefix with `__` between
    /// section and key, e.g. `DEVDIAG_SERVER__PORT` or
    /// `DEVDIAG_TELEMETRY__PROFILES_FILE`.
    pub fn from_figment(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".devdiag.toml"));
        let user_config = directories::ProjectDirs::from("", "", "devdiag")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        for path in [user_config, local_config].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        if let Some(ref path) = overrides.config_file {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("DEVDIAG_").split("__"));

        if let Some(p) = overrides.port {
            figment = figment.merge(Serialized::default("server.port", p));
        }
        if let Some(ref dd) = overrides.data_dir {
            figment = figment.merge(Serialized::default("storage.data_dir", dd));
        }
        if let Some(ref url) = overrides.hostif_url {
            figment = figment.merge(Serialized::default("diagnostics.hostif_url", url));
        }
        if let Some(ref pf) = overrides.profiles_file {
            figment = figment.merge(Serialized::default("telemetry.profiles_file", pf));
        }
        if let Some(ref pd) = overrides.persistent_dir {
            figment = figment.merge(Serialized::default("telemetry.persistent_dir", pd));
        }
        if let Some(ref level) = overrides.log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        let config_file: ConfigFile = figment.extract()?;
        Self::from_file(config_file)
    }

    fn from_file(config_file: ConfigFile) -> anyhow::Result<Self> {
        let data_paths = DataPaths::resolve(PathConfig {
            data_dir: config_file.storage.data_dir,
            parameters_path: config_file.storage.parameters_path,
        })?;

        Ok(Self {
            port: config_file.server.port,
            cors_allowed_origins: config_file.server.cors_allowed_origins,
            data_dir: data_paths.data_dir,
            parameters_path: data_paths.parameters_path,
            hostif_url: config_file.diagnostics.hostif_url,
            hostif_timeout: Duration::from_secs(config_file.diagnostics.hostif_timeout_secs),
            event_buffer: config_file.diagnostics.event_buffer,
            profiles_file: config_file.telemetry.profiles_file,
            persistent_dir: config_file.telemetry.persistent_dir,
            marker_log: config_file.telemetry.marker_log,
            log_file: config_file.logging.log_file,
            log_level: config_file.logging.log_level,
        })
    }

    /// Configuration rooted in `data_dir` with every other value at its default.
    ///
    /// Used by tests and embedders that do not want file or env lookups.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let mut config_file = ConfigFile::default();
        config_file.storage.data_dir = Some(data_dir.into());
        Self::from_file(config_file)
    }
}
