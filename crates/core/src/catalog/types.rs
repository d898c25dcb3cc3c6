//! Types for the series/episode catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality::QualityProfile;
use crate::release::ParsedEpisodeInfo;

/// A monitored series together with its quality profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: i32,
    pub title: String,
    pub profile: QualityProfile,
}

/// A single episode of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i32,
    pub series_id: i32,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<DateTime<Utc>>,
}

/// Errors raised by the catalog backend.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Read-only access to the series catalog.
#[async_trait]
pub trait EpisodeCatalog: Send + Sync {
    /// Look up a series by id. `None` when it has been deleted.
    async fn get_series(&self, series_id: i32) -> Result<Option<Series>, CatalogError>;

    /// Resolve parsed release info to the episodes it covers.
    ///
    /// Returns an empty list when there is no confident match.
    async fn resolve_episodes(
        &self,
        parsed: &ParsedEpisodeInfo,
        series: &Series,
    ) -> Result<Vec<Episode>, CatalogError>;
}
