//! Sync orchestrator: one fetch → decide → admit → reconcile cycle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::decision::{DecisionMaker, DownloadDecision};
use crate::download::AdmissionProcessor;
use crate::events::{self, EventHandle, SyncEvent};
use crate::metrics;
use crate::pending::PendingReleaseService;
use crate::release::{ReleaseCandidate, ReleaseFeed};

use super::config::SyncConfig;
use super::types::{EpisodeSearch, SyncCommand, SyncError, SyncReport};

/// Clears the in-flight flag when a cycle ends, including on error.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs sync cycles. Only one cycle is in flight at a time.
pub struct SyncService {
    config: SyncConfig,
    feeds: Vec<Arc<dyn ReleaseFeed>>,
    decision_maker: DecisionMaker,
    admission: AdmissionProcessor,
    pending: Arc<PendingReleaseService>,
    search: Arc<dyn EpisodeSearch>,
    events: Option<EventHandle>,
    running: AtomicBool,
}

impl SyncService {
    pub fn new(
        config: SyncConfig,
        feeds: Vec<Arc<dyn ReleaseFeed>>,
        decision_maker: DecisionMaker,
        admission: AdmissionProcessor,
        pending: Arc<PendingReleaseService>,
        search: Arc<dyn EpisodeSearch>,
    ) -> Self {
        Self {
            config,
            feeds,
            decision_maker,
            admission,
            pending,
            search,
            events: None,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = Some(events);
        self
    }

    /// Whether a cycle is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Run a scheduled sync, then trigger a catch-up search if the previous
    /// cycle is stale.
    pub async fn execute(&self, command: SyncCommand) -> Result<SyncReport, SyncError> {
        let mut report = self.sync().await?;

        let Some(last) = command.last_execution_time else {
            return Ok(report);
        };

        if !self.config.catchup_enabled || Utc::now() - last <= self.config.stale_after() {
            return Ok(report);
        }

        let since = last - self.config.catchup_lookback();
        let excluded = report.resolved_episode_ids();
        info!(
            "RSS sync hasn't run since: {}. Searching for any missing episodes since then.",
            last
        );

        let result = self.search.search_missing_aired_after(since, &excluded).await;
        metrics::record_external("episode_search", "missing_aired_after", result.is_ok());
        match result {
            Ok(()) => {
                events::emit(
                    &self.events,
                    SyncEvent::CatchUpSearchTriggered {
                        since,
                        excluded_episodes: excluded.len(),
                    },
                );
                report.catch_up_since = Some(since);
            }
            Err(e) => warn!("Catch-up search failed: {}", e),
        }

        Ok(report)
    }

    /// Run one sync cycle.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("RSS sync already running, skipping request");
            metrics::SYNC_CYCLES.with_label_values(&["rejected"]).inc();
            return Err(SyncError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let timer = metrics::SYNC_DURATION.start_timer();
        let result = self.run_cycle().await;
        timer.observe_duration();

        match &result {
            Ok(_) => metrics::SYNC_CYCLES.with_label_values(&["completed"]).inc(),
            Err(e) => {
                error!("RSS sync failed: {}", e);
                metrics::SYNC_CYCLES.with_label_values(&["failed"]).inc();
            }
        }

        result
    }

    async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        let sync_id = Uuid::new_v4();
        info!("Starting RSS sync {}", sync_id);

        let mut candidates = self.fetch_feeds().await;
        match self.pending.get_pending_candidates().await {
            Ok(pending) => {
                debug!("Re-evaluating {} pending release(s)", pending.len());
                candidates.extend(pending);
            }
            Err(e) => warn!("Unable to load pending releases: {}", e),
        }
        let found = candidates.len();

        let decisions = self.decision_maker.rss_decisions(candidates).await?;
        let grabbed = self.admission.download_approved(&decisions).await;

        if let Err(e) = self.pending.remove_grabbed(&grabbed).await {
            warn!("Unable to clear grabbed pending releases: {}", e);
        }

        let pending = self.defer_temporarily_rejected(decisions, &grabbed).await;

        let report = SyncReport {
            sync_id,
            found,
            grabbed,
            pending,
            catch_up_since: None,
        };

        info!("{}", report.summary());
        metrics::RELEASES_FOUND.inc_by(report.found as u64);
        metrics::RELEASES_GRABBED.inc_by(report.grabbed.len() as u64);
        metrics::RELEASES_DEFERRED.inc_by(report.pending.len() as u64);
        events::emit(
            &self.events,
            SyncEvent::SyncCompleted {
                sync_id,
                found: report.found,
                grabbed: report.grabbed.len(),
                pending: report.pending.len(),
            },
        );

        Ok(report)
    }

    /// Fetch every feed concurrently. A failing feed contributes nothing.
    async fn fetch_feeds(&self) -> Vec<ReleaseCandidate> {
        let results = join_all(self.feeds.iter().map(|feed| async move {
            (feed.name().to_string(), feed.fetch().await)
        }))
        .await;

        let mut candidates = Vec::new();
        for (name, result) in results {
            metrics::record_external(&name, "fetch", result.is_ok());
            match result {
                Ok(fetched) => {
                    debug!("Feed {} returned {} release(s)", name, fetched.len());
                    candidates.extend(fetched);
                }
                Err(e) => warn!("Feed {} failed: {}", name, e),
            }
        }

        candidates
    }

    /// Hand temporarily rejected decisions to the pending queue, except
    /// those overlapping an episode grabbed in this cycle.
    async fn defer_temporarily_rejected(
        &self,
        decisions: Vec<DownloadDecision>,
        grabbed: &[DownloadDecision],
    ) -> Vec<DownloadDecision> {
        let grabbed_episodes: HashSet<i32> = grabbed
            .iter()
            .flat_map(|d| d.candidate.episode_ids())
            .collect();
        let mut deferred = Vec::new();

        for decision in decisions {
            if !decision.is_temporarily_rejected() || !decision.has_episodes() {
                continue;
            }

            if decision
                .candidate
                .episodes
                .iter()
                .any(|e| grabbed_episodes.contains(&e.id))
            {
                debug!("Not deferring {}: episodes grabbed in this cycle", decision.candidate);
                continue;
            }

            if let Err(e) = self.pending.add(&decision).await {
                warn!("Unable to add pending release {}: {}", decision.candidate, e);
                continue;
            }
            deferred.push(decision);
        }

        deferred
    }
}
