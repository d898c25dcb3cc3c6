//! Submission of approved decisions to the download client.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::decision::DownloadDecision;
use crate::events::{self, EventHandle, SyncEvent};
use crate::metrics;

use super::prioritizer::prioritize_decisions;
use super::DownloadClient;

/// Turns approved decisions into download client submissions.
///
/// Within one pass the first (highest priority) decision for an episode
/// wins; later decisions overlapping an admitted one are skipped.
pub struct AdmissionProcessor {
    client: Arc<dyn DownloadClient>,
    events: Option<EventHandle>,
}

impl AdmissionProcessor {
    pub fn new(client: Arc<dyn DownloadClient>) -> Self {
        Self {
            client,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = Some(events);
        self
    }

    /// Submit approved decisions in priority order.
    ///
    /// Returns the decisions that were actually submitted. A submission
    /// failure is logged and only skips that decision.
    pub async fn download_approved(&self, decisions: &[DownloadDecision]) -> Vec<DownloadDecision> {
        let qualified: Vec<DownloadDecision> = decisions
            .iter()
            .filter(|d| d.is_approved() && d.has_episodes())
            .cloned()
            .collect();

        let mut admitted_episodes: HashSet<i32> = HashSet::new();
        let mut downloaded = Vec::new();

        for decision in prioritize_decisions(qualified) {
            let candidate = &decision.candidate;

            if candidate
                .episodes
                .iter()
                .any(|e| admitted_episodes.contains(&e.id))
            {
                debug!("Skipping {}: episodes already grabbed in this pass", candidate);
                continue;
            }

            match self.client.submit(candidate).await {
                Ok(download_id) => {
                    metrics::record_external(self.client.name(), "submit", true);
                    info!(
                        "Grabbed {} via {} (download id {})",
                        candidate,
                        self.client.name(),
                        download_id
                    );

                    events::emit(
                        &self.events,
                        SyncEvent::ReleaseGrabbed {
                            series_id: candidate.series.id,
                            episode_ids: candidate.episodes.iter().map(|e| e.id).collect(),
                            title: candidate.release.title.clone(),
                            download_id,
                        },
                    );

                    admitted_episodes.extend(candidate.episodes.iter().map(|e| e.id));
                    downloaded.push(decision);
                }
                Err(e) => {
                    metrics::record_external(self.client.name(), "submit", false);
                    warn!("Couldn't add report to download queue. {}: {}", candidate, e);
                }
            }
        }

        downloaded
    }
}
