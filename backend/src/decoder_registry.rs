//! Decoder status registry.
//!
//! Keeps the most recently reported status of every named decode pipeline,
//! with video and audio pipelines tracked in independent tables, and
//! answers "how active are the decoders of this kind" queries.

use devdiag_types::{DecoderKind, DecoderStatus, DecoderStatusInfo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type StatusTable = HashMap<String, DecoderStatusInfo>;

fn aggregate(table: &StatusTable) -> DecoderStatus {
    table
        .values()
        .map(|info| info.status)
        .max()
        .unwrap_or(DecoderStatus::Idle)
}

fn insert(
    table: &mut StatusTable,
    pipeline_name: &str,
    status: DecoderStatus,
) -> Option<DecoderStatus> {
    table
        .insert(
            pipeline_name.to_string(),
            DecoderStatusInfo {
                pipeline_name: pipeline_name.to_string(),
                status,
            },
        )
        .map(|info| info.status)
}

/// A recorded update together with the kind's aggregate around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub status: DecoderStatus,
    pub previous_aggregate: DecoderStatus,
    pub aggregate: DecoderStatus,
}

/// Registry of per-pipeline decoder status.
///
/// Cloning is cheap and every clone shares the same tables, so one handle
/// can go to the event feed and another to the request handlers.
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    video: Mutex<StatusTable>,
    audio: Mutex<StatusTable>,
}

impl DecoderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: DecoderKind) -> &Mutex<StatusTable> {
        match kind {
            DecoderKind::Video => &self.inner.video,
            DecoderKind::Audio => &self.inner.audio,
        }
    }

    /// Apply a raw status update from the platform.
    ///
    /// Unrecognized status text and empty pipeline names are dropped without
    /// touching the table. Returns `true` when the update was recorded.
    pub fn on_status_update(
        &self,
        kind: DecoderKind,
        pipeline_name: &str,
        status_text: &str,
    ) -> bool {
        self.apply_update(kind, pipeline_name, status_text).is_some()
    }

    /// Like [`on_status_update`](Self::on_status_update), but also reports the
    /// aggregate status of `kind` immediately before and after the write.
    ///
    /// Both aggregates are read under the same lock as the write, so they
    /// describe exactly this update.
    pub fn apply_update(
        &self,
        kind: DecoderKind,
        pipeline_name: &str,
        status_text: &str,
    ) -> Option<AppliedUpdate> {
        if pipeline_name.is_empty() {
            tracing::debug!("Ignoring {} decoder update without a pipeline name", kind);
            return None;
        }

        let status = match status_text.parse::<DecoderStatus>() {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(
                    "Ignoring {} decoder update for '{}': {}",
                    kind,
                    pipeline_name,
                    e
                );
                return None;
            }
        };

        let mut table = self.table(kind).lock();
        let previous_aggregate = aggregate(&table);
        let previous = insert(&mut table, pipeline_name, status);
        let current_aggregate = aggregate(&table);
        drop(table);

        tracing::debug!(
            "{} pipeline '{}': {:?} -> {}",
            kind,
            pipeline_name,
            previous,
            status
        );
        Some(AppliedUpdate {
            status,
            previous_aggregate,
            aggregate: current_aggregate,
        })
    }

    /// Record `status` for a pipeline, returning the status it replaced.
    pub fn set_status(
        &self,
        kind: DecoderKind,
        pipeline_name: &str,
        status: DecoderStatus,
    ) -> Option<DecoderStatus> {
        insert(&mut self.table(kind).lock(), pipeline_name, status)
    }

    /// Highest-priority status across all pipelines of `kind`.
    ///
    /// `Active` wins over `Paused`, which wins over `Idle`. With no known
    /// pipelines the decoders are considered idle.
    pub fn most_active_status(&self, kind: DecoderKind) -> DecoderStatus {
        aggregate(&self.table(kind).lock())
    }

    /// Latest status of a single pipeline, if it has ever reported.
    pub fn status_of(&self, kind: DecoderKind, pipeline_name: &str) -> Option<DecoderStatus> {
        self.table(kind).lock().get(pipeline_name).map(|info| info.status)
    }

    /// Snapshot of every known pipeline of `kind`, sorted by name.
    pub fn pipelines(&self, kind: DecoderKind) -> Vec<DecoderStatusInfo> {
        let mut pipelines: Vec<DecoderStatusInfo> =
            self.table(kind).lock().values().cloned().collect();
        pipelines.sort_by(|a, b| a.pipeline_name.cmp(&b.pipeline_name));
        pipelines
    }

    /// Number of known pipelines of `kind`.
    pub fn len(&self, kind: DecoderKind) -> usize {
        self.table(kind).lock().len()
    }

    /// Check whether no pipeline of `kind` has reported yet.
    pub fn is_empty(&self, kind: DecoderKind) -> bool {
        self.table(kind).lock().is_empty()
    }
}
