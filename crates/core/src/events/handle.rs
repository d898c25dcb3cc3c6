use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::SyncEvent;

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: SyncEvent,
}

/// Handle for emitting notifications
///
/// This is cheaply cloneable and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct EventHandle {
    tx: mpsc::Sender<EventEnvelope>,
}

impl EventHandle {
    /// Create a new event handle from a channel sender
    pub fn new(tx: mpsc::Sender<EventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit an event without blocking
    ///
    /// Returns true if the event was queued. A full or closed channel is
    /// logged and the event dropped.
    pub fn try_emit(&self, event: SyncEvent) -> bool {
        let envelope = EventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to emit event: {}", e);
                false
            }
        }
    }
}

/// Create a notification channel
///
/// Returns the handle to clone into components and the receiver the host
/// process drains.
pub fn create_event_channel(buffer_size: usize) -> (EventHandle, mpsc::Receiver<EventEnvelope>) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (EventHandle::new(tx), rx)
}

/// Emit through an optional handle.
pub(crate) fn emit(handle: &Option<EventHandle>, event: SyncEvent) {
    if let Some(handle) = handle {
        handle.try_emit(event);
    }
}
