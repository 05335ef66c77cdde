//! Device diagnostics server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use devdiag::config::{Config, ConfigOverrides};
use devdiag::{create_app_with_cors, state::AppState};

/// Decoder status and telemetry diagnostics service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "DEVDIAG_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "DEVDIAG_PORT")]
    port: Option<u16>,

    /// Directory holding service data
    #[arg(long, env = "DEVDIAG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Host-interface daemon endpoint
    #[arg(long, env = "DEVDIAG_HOSTIF_URL")]
    hostif_url: Option<String>,

    /// Default telemetry profile pack
    #[arg(long, env = "DEVDIAG_PROFILES_FILE")]
    profiles_file: Option<PathBuf>,

    /// Folder of persisted telemetry profiles
    #[arg(long, env = "DEVDIAG_PERSISTENT_DIR")]
    persistent_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DEVDIAG_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_file: args.config,
            port: args.port,
            data_dir: args.data_dir,
            hostif_url: args.hostif_url,
            profiles_file: args.profiles_file,
            persistent_dir: args.persistent_dir,
            log_level: args.log_level,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_figment(args.into())?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config)?;
    info!("Configuration loaded");

    run(config)
}

/// Install the stdout logger and, if configured, a file logger.
///
/// The configured log level wins over `RUST_LOG`; `info` is the fallback.
fn init_logging(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = || match &config.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // Must be read before any thread is spawned
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(offset, Rfc3339);

    let stdout_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_target(false)
        .compact()
        .with_filter(filter());

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(directory)?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if let Some(path) = &config.log_file {
        info!("Logging to file: {}", path.display());
    }

    Ok(guard)
}

#[tokio::main]
async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting device diagnostics server...");
    info!("Data directory: {}", config.data_dir.display());

    let state = AppState::from_config(&config)?;
    let app = create_app_with_cors(state, config.cors_allowed_origins.clone());

    // Bind to all interfaces so the service is reachable on the device network
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}
