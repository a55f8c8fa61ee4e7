use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::{
        notification::NotificationView,
        sse::{Handshake, ServerEvent},
    },
    state::{SharedState, notification::EVENT_NOTIFICATION},
};

/// SSE event name of the greeting sent to each new subscriber.
pub const EVENT_HANDSHAKE: &str = "handshake";

/// Subscribe to notification events, returning the events a new client must
/// see first: a handshake, then the message currently displayed, if any.
pub fn subscribe_notifications(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Vec<ServerEvent>) {
    let receiver = state.notifications().subscribe();

    let mut initial = Vec::with_capacity(2);
    push_json(
        &mut initial,
        EVENT_HANDSHAKE,
        &Handshake {
            message: "notification stream connected".into(),
        },
    );
    if let Some(current) = state.notifications().current() {
        push_json(
            &mut initial,
            EVENT_NOTIFICATION,
            &NotificationView::from(current),
        );
    }
    (receiver, initial)
}

fn push_json<T: serde::Serialize>(events: &mut Vec<ServerEvent>, name: &str, payload: &T) {
    match ServerEvent::json(Some(name.to_string()), payload) {
        Ok(event) => events.push(event),
        Err(err) => warn!(event = name, error = %err, "failed to serialise SSE payload"),
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, replaying `initial`
/// first and forwarding events until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
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
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "notification subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("notification SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
