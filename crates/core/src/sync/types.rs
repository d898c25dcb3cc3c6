//! Types for the sync orchestrator.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::decision::{DecisionError, DownloadDecision};

/// Errors that abort a sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another cycle is in flight.
    #[error("sync already running")]
    AlreadyRunning,

    #[error("decision error: {0}")]
    Decision(#[from] DecisionError),
}

/// Errors raised by the catch-up search collaborator.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search unavailable: {0}")]
    Unavailable(String),

    #[error("Search failed: {0}")]
    Failed(String),
}

/// Triggers searches for missing episodes.
#[async_trait]
pub trait EpisodeSearch: Send + Sync {
    /// Search for monitored episodes aired after `since`, skipping the
    /// given episode ids.
    async fn search_missing_aired_after(
        &self,
        since: DateTime<Utc>,
        excluded_episode_ids: &[i32],
    ) -> Result<(), SearchError>;
}

/// A scheduled sync request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCommand {
    /// When the previous successful cycle ran, if known.
    pub last_execution_time: Option<DateTime<Utc>>,
}

impl SyncCommand {
    pub fn new(last_execution_time: Option<DateTime<Utc>>) -> Self {
        Self {
            last_execution_time,
        }
    }
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub sync_id: Uuid,
    /// Candidates judged: fresh feed results plus re-hydrated pending entries.
    pub found: usize,
    pub grabbed: Vec<DownloadDecision>,
    /// Temporarily rejected decisions handed to the pending queue.
    pub pending: Vec<DownloadDecision>,
    /// Start of the catch-up search window, when one was triggered.
    pub catch_up_since: Option<DateTime<Utc>>,
}

impl SyncReport {
    /// Episodes covered by grabbed or pending decisions.
    pub fn resolved_episode_ids(&self) -> Vec<i32> {
        let mut seen = HashSet::new();
        self.grabbed
            .iter()
            .chain(self.pending.iter())
            .flat_map(|d| d.candidate.episodes.iter().map(|e| e.id))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// The summary line logged at the end of a cycle.
    pub fn summary(&self) -> String {
        let mut message = format!(
            "RSS sync completed. Reports found: {}, Reports grabbed: {}",
            self.found,
            self.grabbed.len()
        );
        if !self.pending.is_empty() {
            message.push_str(&format!(", Reports pending: {}", self.pending.len()));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::Quality;
    use crate::testing::fixtures;

    fn report(grabbed: Vec<DownloadDecision>, pending: Vec<DownloadDecision>) -> SyncReport {
        SyncReport {
            sync_id: Uuid::new_v4(),
            found: 5,
            grabbed,
            pending,
            catch_up_since: None,
        }
    }

    #[test]
    fn test_summary_omits_pending_when_none() {
        let r = report(vec![], vec![]);
        assert_eq!(r.summary(), "RSS sync completed. Reports found: 5, Reports grabbed: 0");
    }

    #[test]
    fn test_summary_and_resolved_ids() {
        let series = fixtures::series(1, fixtures::hd_profile());
        let e1 = fixtures::episode(&series, 1, 1, 1);
        let e2 = fixtures::episode(&series, 2, 1, 2);

        let grabbed = DownloadDecision::approved(fixtures::candidate(
            &series,
            vec![e1.clone(), e2.clone()],
            Quality::Bluray720p.into(),
        ));
        let pending = DownloadDecision::approved(fixtures::candidate(
            &series,
            vec![e2],
            Quality::Hdtv720p.into(),
        ));

        let r = report(vec![grabbed], vec![pending]);
        assert_eq!(
            r.summary(),
            "RSS sync completed. Reports found: 5, Reports grabbed: 1, Reports pending: 1"
        );
        assert_eq!(r.resolved_episode_ids(), vec![1, 2]);
    }
}
