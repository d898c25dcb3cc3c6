//! Types for download client operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality::{QualityModel, QualityProfile};
use crate::release::ReleaseCandidate;

/// Errors that can occur during download client operations.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Release rejected by client: {0}")]
    Rejected(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Errors that can occur while querying download history.
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("History unavailable: {0}")]
    Unavailable(String),
}

/// State of a download as projected from the client's queue/history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedDownloadState {
    Downloading,
    Downloaded,
    Imported,
    DownloadFailed,
}

impl TrackedDownloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedDownloadState::Downloading => "downloading",
            TrackedDownloadState::Downloaded => "downloaded",
            TrackedDownloadState::Imported => "imported",
            TrackedDownloadState::DownloadFailed => "download_failed",
        }
    }

    /// Terminal failure: the download will not complete.
    pub fn is_failed(&self) -> bool {
        matches!(self, TrackedDownloadState::DownloadFailed)
    }
}

/// A download known to the client, resolved to series/episodes/quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedDownload {
    /// Client-assigned job id.
    pub download_id: String,
    /// Client name.
    pub client: String,
    pub title: String,
    pub state: TrackedDownloadState,
    pub series_id: i32,
    pub episode_ids: Vec<i32>,
    pub quality: QualityModel,
}

/// Submits releases to a download client.
#[async_trait]
pub trait DownloadClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Submit a release, returning the client's job id.
    async fn submit(&self, candidate: &ReleaseCandidate) -> Result<String, DownloadError>;
}

/// Lists downloads currently known to the download clients.
#[async_trait]
pub trait DownloadTracker: Send + Sync {
    async fn currently_tracked(&self) -> Result<Vec<TrackedDownload>, DownloadError>;
}

/// Answers what has already been downloaded for an episode.
#[async_trait]
pub trait DownloadHistory: Send + Sync {
    /// Best quality grabbed for the episode, ranked by `profile`.
    async fn best_quality_downloaded(
        &self,
        profile: &QualityProfile,
        episode_id: i32,
    ) -> Result<Option<QualityModel>, HistoryError>;
}
