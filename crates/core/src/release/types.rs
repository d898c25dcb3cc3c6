//! Types for discovered releases.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Episode, Series};
use crate::quality::QualityModel;

/// Source metadata for a release as published by an indexer feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Indexer-unique identifier.
    pub guid: String,
    pub title: String,
    pub size_bytes: u64,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
    pub indexer: String,
    pub publish_date: DateTime<Utc>,
}

impl ReleaseInfo {
    /// Time elapsed since the release was published.
    pub fn age(&self) -> chrono::Duration {
        self.age_at(Utc::now())
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.publish_date
    }
}

/// Episode information parsed from a release title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEpisodeInfo {
    pub series_title: String,
    pub season_number: u32,
    #[serde(default)]
    pub episode_numbers: Vec<u32>,
    #[serde(default)]
    pub full_season: bool,
    pub quality: QualityModel,
}

/// A release resolved against the catalog: the unit every rule judges.
///
/// One candidate may cover several episodes (multi-part release).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    pub release: ReleaseInfo,
    pub parsed: ParsedEpisodeInfo,
    pub series: Series,
    pub episodes: Vec<Episode>,
}

impl ReleaseCandidate {
    pub fn quality(&self) -> &QualityModel {
        &self.parsed.quality
    }

    pub fn episode_ids(&self) -> HashSet<i32> {
        self.episodes.iter().map(|e| e.id).collect()
    }

    /// Whether this candidate covers any of the given episodes of its series.
    pub fn overlaps(&self, series_id: i32, episode_ids: &HashSet<i32>) -> bool {
        self.series.id == series_id && self.episodes.iter().any(|e| episode_ids.contains(&e.id))
    }
}

impl fmt::Display for ReleaseCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.parsed.quality, self.release.title)
    }
}

/// Errors that can occur while fetching a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Feed parse error: {0}")]
    ParseError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Source of fresh release candidates (RSS, indexer API, ...).
///
/// Retries and backoff are the implementation's concern.
#[async_trait]
pub trait ReleaseFeed: Send + Sync {
    /// Feed name for logging.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<ReleaseCandidate>, FeedError>;
}
