use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, SystemTime},
};

use tokio::{sync::broadcast, time::sleep};

use crate::{
    dto::{
        notification::{NotificationKind, NotificationView},
        sse::ServerEvent,
    },
    state::sse::SseHub,
};

/// SSE event name carrying a newly shown message.
pub const EVENT_NOTIFICATION: &str = "notification";
/// SSE event name sent when a message loses its styling.
pub const EVENT_NOTIFICATION_CLEARED: &str = "notification.cleared";
/// Default time a message keeps its styling.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Message as held by the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Text shown to the user.
    pub message: String,
    /// Styling; `None` once the message has expired.
    pub kind: Option<NotificationKind>,
    /// When the message was shown.
    pub shown_at: SystemTime,
}

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    generation: u64,
}

struct SinkInner {
    hub: SseHub,
    slot: Mutex<Slot>,
    ttl: Duration,
}

/// Single-slot message display with timed styling reset.
///
/// Only one message is visible at a time. Every [`NotificationSink::show`]
/// bumps a generation counter; the reset scheduled by an older message is a
/// no-op once a newer one has been shown.
#[derive(Clone)]
pub struct NotificationSink {
    inner: Arc<SinkInner>,
}

impl NotificationSink {
    /// Create a sink whose messages keep their styling for `ttl`.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                hub: SseHub::new(capacity),
                slot: Mutex::new(Slot::default()),
                ttl,
            }),
        }
    }

    /// Display `message`, replacing whatever was shown, and schedule its styling reset.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification {
            message: message.into(),
            kind: Some(kind),
            shown_at: SystemTime::now(),
        };

        let generation = {
            let mut slot = self.slot();
            slot.generation += 1;
            slot.current = Some(notification.clone());
            slot.generation
        };
        self.inner
            .hub
            .broadcast_json(EVENT_NOTIFICATION, &NotificationView::from(notification));

        let sink = self.clone();
        tokio::spawn(async move {
            sleep(sink.inner.ttl).await;
            sink.expire(generation);
        });
    }

    /// Message currently displayed, if any.
    pub fn current(&self) -> Option<Notification> {
        self.slot().current.clone()
    }

    /// Subscribe to notification events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.hub.subscribe()
    }

    fn expire(&self, generation: u64) {
        let cleared = {
            let mut slot = self.slot();
            if slot.generation != generation {
                return;
            }
            let Some(current) = slot.current.as_mut() else {
                return;
            };
            current.kind = None;
            current.clone()
        };
        self.inner
            .hub
            .broadcast_json(EVENT_NOTIFICATION_CLEARED, &NotificationView::from(cleared));
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
