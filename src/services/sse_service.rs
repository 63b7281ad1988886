use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::{sse_events::EVENT_DISPLAY_UPDATED, status_service},
    state::SharedState,
};

/// Subscribe to the display stream and build the snapshot sent before any live event.
///
/// Subscribing first means a mutation committed while the snapshot is computed still reaches the
/// client afterwards.
pub async fn subscribe_display(
    state: &SharedState,
) -> Result<(Option<ServerEvent>, broadcast::Receiver<ServerEvent>), ServiceError> {
    let receiver = state.display_sse().subscribe();
    let snapshot = status_service::status(state).await?;
    let initial = match ServerEvent::json(Some(EVENT_DISPLAY_UPDATED.to_string()), &snapshot) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize initial display snapshot");
            None
        }
    };
    info!(
        subscribers = state.display_sse().subscriber_count(),
        "new display SSE connection"
    );
    Ok((initial, receiver))
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response that starts with `initial`.
pub fn to_sse_stream(
    initial: Option<ServerEvent>,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(initial) = initial {
            if tx.send(Ok(to_event(initial))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // Every display event is a full snapshot, so skipping is lossless.
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "display SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("display SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
