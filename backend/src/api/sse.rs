//! Server-Sent Events endpoint for real-time updates.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::Stream;
use std::convert::Infallible;
use tracing::info;

use crate::state::AppState;

/// Subscribe to decoder and telemetry events.
///
/// Each SSE message carries one JSON-encoded event, for example
/// `{"type":"AggregateStatusChanged","data":{"kind":"video","status":"ACTIVE"}}`.
pub async fn events_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(
        "New SSE client connected (total subscribers: {})",
        state.events().subscriber_count() + 1
    );
    state.events().subscribe()
}
