//! Decoder event feed.
//!
//! Status updates from the platform arrive on a bounded channel and are
//! handed, one at a time, to a closure running on its own worker task.
//! Producers (the HTTP ingest endpoint, in-process bridges) only need a
//! clone of [`DecoderEventFeed`].

use crate::decoder_registry::DecoderRegistry;
use crate::events::EventBroadcaster;
use devdiag_types::api::DecoderStatusEvent;
use devdiag_types::DiagEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Default number of queued events before producers wait.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Error type for publishing onto the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Decoder event feed is closed")]
    Closed,

    #[error("Decoder event feed is full")]
    Full,
}

/// Sending side of the decoder event feed.
#[derive(Debug, Clone)]
pub struct DecoderEventFeed {
    sender: mpsc::Sender<DecoderStatusEvent>,
}

impl DecoderEventFeed {
    /// Start a worker task that invokes `handler` for every published event.
    ///
    /// The worker exits once every feed handle has been dropped. Must be
    /// called from within a tokio runtime.
    pub fn spawn<F>(capacity: usize, mut handler: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut(DecoderStatusEvent) + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<DecoderStatusEvent>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                trace!(
                    "Decoder event: {} '{}' {}",
                    event.kind,
                    event.pipeline_name,
                    event.status
                );
                handler(event);
            }
            debug!("Decoder event feed closed");
        });

        (Self { sender }, worker)
    }

    /// Queue an event, waiting for capacity if the feed is full.
    pub async fn publish(&self, event: DecoderStatusEvent) -> Result<(), FeedError> {
        self.sender.send(event).await.map_err(|_| FeedError::Closed)
    }

    /// Queue an event without waiting.
    ///
    /// For producers running outside the async runtime, such as platform
    /// callback threads.
    pub fn try_publish(&self, event: DecoderStatusEvent) -> Result<(), FeedError> {
        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => FeedError::Full,
            mpsc::error::TrySendError::Closed(_) => FeedError::Closed,
        })
    }

    /// Check whether the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Build the feed handler that applies updates to `registry`.
///
/// Recorded updates are broadcast as [`DiagEvent::DecoderStatusChanged`]; a
/// change of the kind's aggregate status is additionally broadcast as
/// [`DiagEvent::AggregateStatusChanged`].
pub fn registry_handler(
    registry: DecoderRegistry,
    events: EventBroadcaster,
) -> impl FnMut(DecoderStatusEvent) + Send + 'static {
    move |event: DecoderStatusEvent| {
        let kind = event.kind;
        let applied = registry.apply_update(kind, &event.pipeline_name, &event.status);
        let Some(update) = applied else {
            return;
        };

        events.broadcast(DiagEvent::DecoderStatusChanged {
            kind,
            pipeline_name: event.pipeline_name,
            status: update.status,
        });

        if update.aggregate != update.previous_aggregate {
            events.broadcast(DiagEvent::AggregateStatusChanged {
                kind,
                status: update.aggregate,
            });
        }
    }
}
