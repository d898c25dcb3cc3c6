//! Types for the pending release queue.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, Episode, Series};
use crate::download::DownloadError;
use crate::quality::QualityModel;
use crate::release::{ParsedEpisodeInfo, ReleaseInfo};

/// A temporarily rejected release persisted for a later retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRelease {
    pub id: i64,
    pub series_id: i32,
    pub title: String,
    /// When the entry was created.
    pub added: DateTime<Utc>,
    /// Publish time plus the profile's grab delay.
    pub retry_time: DateTime<Utc>,
    pub parsed: ParsedEpisodeInfo,
    pub release: ReleaseInfo,
}

/// A pending release not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPendingRelease {
    pub series_id: i32,
    pub title: String,
    pub added: DateTime<Utc>,
    pub retry_time: DateTime<Utc>,
    pub parsed: ParsedEpisodeInfo,
    pub release: ReleaseInfo,
}

/// Status label reported for pending queue rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Pending,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the queue view: a pending release projected onto one of
/// the episodes it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    /// Id of the pending release. Shared by every row of a multi-episode release.
    pub id: i64,
    pub series: Series,
    pub episode: Episode,
    pub quality: QualityModel,
    pub title: String,
    pub size_bytes: u64,
    /// Always equal to `size_bytes`; nothing has been downloaded yet.
    pub size_left_bytes: u64,
    /// Retry time minus now. Negative once the entry is overdue.
    pub time_left: chrono::Duration,
    pub retry_time: DateTime<Utc>,
    pub status: QueueStatus,
}

/// Result of adding a temporarily rejected decision to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No overlapping entry existed.
    Inserted { id: i64 },
    /// An overlapping entry of lower quality was replaced.
    Replaced { removed: i64, id: i64 },
    /// An overlapping entry of equal or better quality was kept.
    Discarded { existing: i64 },
}

/// Errors from pending queue operations.
#[derive(Debug, Error)]
pub enum PendingReleaseError {
    #[error("Pending release not found: {0}")]
    NotFound(i64),

    #[error("Series not found: {0}")]
    SeriesNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}
