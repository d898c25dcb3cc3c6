//! Mock episode catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, Episode, EpisodeCatalog, Series};
use crate::release::ParsedEpisodeInfo;

/// In-memory catalog.
///
/// Episodes resolve by series, season and episode number; a full-season
/// release resolves to every known episode of the season. Episode lookups
/// for a series registered with
/// [`fail_episodes_of`](Self::fail_episodes_of) always fail.
#[derive(Debug, Default)]
pub struct MockEpisodeCatalog {
    series: Arc<RwLock<HashMap<i32, Series>>>,
    episodes: Arc<RwLock<Vec<Episode>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    episode_failures: Arc<RwLock<HashMap<i32, CatalogError>>>,
}

impl MockEpisodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_series(&self, series: Series) {
        self.series.write().await.insert(series.id, series);
    }

    /// Simulate a series deletion. Its episodes are kept.
    pub async fn remove_series(&self, series_id: i32) {
        self.series.write().await.remove(&series_id);
    }

    pub async fn add_episodes(&self, episodes: Vec<Episode>) {
        self.episodes.write().await.extend(episodes);
    }

    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn fail_episodes_of(&self, series_id: i32, error: CatalogError) {
        self.episode_failures.write().await.insert(series_id, error);
    }

    async fn check_error(&self) -> Result<(), CatalogError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EpisodeCatalog for MockEpisodeCatalog {
    async fn get_series(&self, series_id: i32) -> Result<Option<Series>, CatalogError> {
        self.check_error().await?;
        Ok(self.series.read().await.get(&series_id).cloned())
    }

    async fn resolve_episodes(
        &self,
        parsed: &ParsedEpisodeInfo,
        series: &Series,
    ) -> Result<Vec<Episode>, CatalogError> {
        self.check_error().await?;
        if let Some(error) = self.episode_failures.read().await.get(&series.id) {
            return Err(error.clone());
        }

        let episodes = self.episodes.read().await;
        let in_season = episodes
            .iter()
            .filter(|e| e.series_id == series.id && e.season_number == parsed.season_number);

        if parsed.full_season {
            return Ok(in_season.cloned().collect());
        }

        let in_season: Vec<&Episode> = in_season.collect();
        Ok(parsed
            .episode_numbers
            .iter()
            .filter_map(|n| in_season.iter().find(|e| e.episode_number == *n))
            .map(|e| (*e).clone())
            .collect())
    }
}
