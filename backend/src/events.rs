//! Fan-out of diagnostics events to Server-Sent-Events subscribers.

use axum::response::sse::{Event, KeepAlive};
use axum::response::Sse;
use devdiag_types::DiagEvent;
use futures::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;

/// Broadcasts decoder and telemetry events to every connected client.
///
/// Slow subscribers lose the oldest events instead of blocking producers.
#[derive(Clone)]
pub struct EventBroadcaster {
    /// Broadcast channel for events
    sender: Arc<broadcast::Sender<DiagEvent>>,
}

impl EventBroadcaster {
    /// Create a new event broadcaster with a buffer size.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: DiagEvent) {
        debug!("Broadcasting event: {}", event.description());
        // Err only means nobody is listening right now
        let _ = self.sender.send(event);
    }

    /// Subscribe to events as an SSE response body.
    pub fn subscribe(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let rx = self.sender.subscribe();
        let stream = BroadcastStream::new(rx);

        let event_stream = stream.filter_map(|result| match result {
            Ok(event) => {
                debug!("Sending SSE event: {}", event.description());
                match serde_json::to_string(&event) {
                    Ok(json) => Some(Ok(Event::default().data(json))),
                    Err(e) => {
                        tracing::error!("Failed to serialize event: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Client lagging, skipping events: {}", e);
                None
            }
        });

        Sse::new(event_stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
    }

    /// Subscribe to raw events, for in-process consumers.
    pub fn receiver(&self) -> broadcast::Receiver<DiagEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100) // Default buffer of 100 events
    }
}
