use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::state::AppState;

/// GET /v1/events/stream
/// One SSE event per `ScheduleEvent`, named after its kind.
pub async fn stream(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match Event::default().event(event.kind()).json_data(&event) {
                Ok(sse) => Some(Ok(sse)),
                Err(e) => {
                    tracing::warn!("Failed to encode {} event: {}", event.kind(), e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                tracing::warn!("Event subscriber lagged, {} event(s) dropped", missed);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
