use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

use crate::dto::sse::ServerEvent;

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Serialise `payload` and broadcast it under the `event` name.
    pub fn broadcast_json<T: Serialize>(&self, event: &str, payload: &T) {
        match ServerEvent::json(Some(event.to_string()), payload) {
            Ok(event) => self.broadcast(event),
            Err(err) => warn!(event, error = %err, "failed to serialise SSE payload"),
        }
    }
}
