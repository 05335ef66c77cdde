//! Telemetry marker log.
//!
//! Application events are always emitted as structured `tracing` events on
//! the `telemetry` target. When a marker file is configured each event is
//! also appended to it as one JSON line.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Destination for application telemetry markers.
#[async_trait]
pub trait MarkerSink: Send + Sync {
    async fn log_marker(&self, event_name: &str, event_value: &str) -> std::io::Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerLine<'a> {
    timestamp: String,
    event_name: &'a str,
    event_value: &'a str,
}

/// Marker log backed by `tracing` and an optional JSON-lines file.
#[derive(Debug, Default)]
pub struct MarkerLog {
    file: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl MarkerLog {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            file,
            write_lock: Mutex::new(()),
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

#[async_trait]
impl MarkerSink for MarkerLog {
    async fn log_marker(&self, event_name: &str, event_value: &str) -> std::io::Result<()> {
        tracing::info!(
            target: "telemetry",
            event_name,
            event_value,
            "Telemetry marker"
        );

        let Some(path) = self.file.as_ref() else {
            return Ok(());
        };

        let line = MarkerLine {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_name,
            event_value,
        };
        let mut json = serde_json::to_string(&line)?;
        json.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_without_file() {
        let log = MarkerLog::default();
        assert!(log.file().is_none());
        log.log_marker("app_start", "1").await.unwrap();
    }

    #[tokio::test]
    async fn test_appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("markers").join("events.jsonl");
        let log = MarkerLog::new(Some(path.clone()));

        log.log_marker("app_start", "netflix").await.unwrap();
        log.log_marker("app_exit", "0").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["eventName"], "app_start");
        assert_eq!(lines[0]["eventValue"], "netflix");
        assert_eq!(lines[1]["eventName"], "app_exit");
        assert!(lines[1]["timestamp"].as_str().is_some());
    }
}
