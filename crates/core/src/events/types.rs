//! Types for outbound notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification types emitted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// An entry was inserted into or removed from the pending queue.
    PendingReleasesUpdated,

    /// A release was submitted to the download client.
    ReleaseGrabbed {
        series_id: i32,
        episode_ids: Vec<i32>,
        title: String,
        download_id: String,
    },

    /// A sync cycle ran to completion.
    SyncCompleted {
        sync_id: Uuid,
        found: usize,
        grabbed: usize,
        pending: usize,
    },

    /// A catch-up search was requested after a stale cycle.
    CatchUpSearchTriggered {
        since: DateTime<Utc>,
        excluded_episodes: usize,
    },
}

impl SyncEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::PendingReleasesUpdated => "pending_releases_updated",
            SyncEvent::ReleaseGrabbed { .. } => "release_grabbed",
            SyncEvent::SyncCompleted { .. } => "sync_completed",
            SyncEvent::CatchUpSearchTriggered { .. } => "catch_up_search_triggered",
        }
    }
}
