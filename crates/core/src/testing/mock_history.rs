//! Mock download history for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{DownloadHistory, HistoryError};
use crate::quality::{QualityModel, QualityProfile};

/// Mock implementation of the DownloadHistory trait keyed by episode id.
#[derive(Debug, Default)]
pub struct MockDownloadHistory {
    best: Arc<RwLock<HashMap<i32, QualityModel>>>,
    /// If set, the next lookup will fail with this error.
    next_error: Arc<RwLock<Option<HistoryError>>>,
}

impl MockDownloadHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the best quality already downloaded for an episode.
    pub async fn set_best(&self, episode_id: i32, quality: QualityModel) {
        self.best.write().await.insert(episode_id, quality);
    }

    pub async fn set_next_error(&self, error: HistoryError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl DownloadHistory for MockDownloadHistory {
    async fn best_quality_downloaded(
        &self,
        _profile: &QualityProfile,
        episode_id: i32,
    ) -> Result<Option<QualityModel>, HistoryError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.best.read().await.get(&episode_id).copied())
    }
}
