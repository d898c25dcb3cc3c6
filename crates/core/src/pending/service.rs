//! Pending release queue: stores temporarily rejected releases and keeps
//! only the best one per overlapping episode set.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{EpisodeCatalog, Series};
use crate::decision::DownloadDecision;
use crate::download::DownloadClient;
use crate::events::{self, EventHandle, SyncEvent};
use crate::metrics;
use crate::quality::QualityComparer;
use crate::release::{ReleaseCandidate, ReleaseInfo};

use super::{
    AddOutcome, NewPendingRelease, PendingRelease, PendingReleaseError, PendingReleaseStore,
    QueueItem, QueueStatus,
};

/// A stored entry re-hydrated against the live catalog.
struct ResolvedPending {
    pending: PendingRelease,
    candidate: ReleaseCandidate,
}

pub struct PendingReleaseService {
    store: Arc<dyn PendingReleaseStore>,
    catalog: Arc<dyn EpisodeCatalog>,
    client: Arc<dyn DownloadClient>,
    events: Option<EventHandle>,
    /// Serializes the read-modify-write of `add` and `remove_grabbed`.
    write_lock: Mutex<()>,
}

impl PendingReleaseService {
    pub fn new(
        store: Arc<dyn PendingReleaseStore>,
        catalog: Arc<dyn EpisodeCatalog>,
        client: Arc<dyn DownloadClient>,
    ) -> Self {
        Self {
            store,
            catalog,
            client,
            events: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = Some(events);
        self
    }

    /// Queue a temporarily rejected decision.
    ///
    /// An overlapping entry for the same series is kept if its quality is
    /// equal or better, otherwise it is replaced.
    pub async fn add(
        &self,
        decision: &DownloadDecision,
    ) -> Result<AddOutcome, PendingReleaseError> {
        let _guard = self.write_lock.lock().await;

        let candidate = &decision.candidate;
        let profile = &candidate.series.profile;
        let episode_ids = candidate.episode_ids();

        let pending = self.resolve_pending().await?;
        let existing = pending
            .iter()
            .find(|p| p.candidate.overlaps(candidate.series.id, &episode_ids));

        let mut removed = None;
        if let Some(existing) = existing {
            let comparer = QualityComparer::new(profile);
            if comparer.meets_or_exceeds(existing.candidate.quality(), candidate.quality()) {
                debug!("Existing pending release meets or exceeds quality");
                metrics::PENDING_QUEUE_CHANGES
                    .with_label_values(&["discarded"])
                    .inc();
                return Ok(AddOutcome::Discarded {
                    existing: existing.pending.id,
                });
            }

            debug!("Removing previously pending release, with lower quality");
            self.delete(existing.pending.id, "replaced")?;
            removed = Some(existing.pending.id);
        }

        debug!("Delaying grab of release: {}", candidate);
        let inserted = self.store.insert(NewPendingRelease {
            series_id: candidate.series.id,
            title: candidate.release.title.clone(),
            added: Utc::now(),
            retry_time: candidate.release.publish_date + profile.grab_delay(),
            parsed: candidate.parsed.clone(),
            release: candidate.release.clone(),
        })?;
        metrics::PENDING_QUEUE_CHANGES
            .with_label_values(&["inserted"])
            .inc();
        events::emit(&self.events, SyncEvent::PendingReleasesUpdated);

        Ok(match removed {
            Some(removed) => AddOutcome::Replaced {
                removed,
                id: inserted.id,
            },
            None => AddOutcome::Inserted { id: inserted.id },
        })
    }

    /// Drop every pending entry made redundant by a grab.
    ///
    /// Returns the ids removed.
    pub async fn remove_grabbed(
        &self,
        grabbed: &[DownloadDecision],
    ) -> Result<Vec<i64>, PendingReleaseError> {
        if grabbed.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self.write_lock.lock().await;

        let pending = self.resolve_pending().await?;
        let mut removed = Vec::new();

        for decision in grabbed {
            let series_id = decision.candidate.series.id;
            let episode_ids = decision.candidate.episode_ids();

            for entry in &pending {
                if removed.contains(&entry.pending.id)
                    || !entry.candidate.overlaps(series_id, &episode_ids)
                {
                    continue;
                }

                debug!(
                    "Removing previously pending release, as it was grabbed: {}",
                    entry.pending.title
                );
                self.delete(entry.pending.id, "removed_grabbed")?;
                removed.push(entry.pending.id);
            }
        }

        Ok(removed)
    }

    /// Raw stored releases, without re-hydration.
    pub fn get_pending(&self) -> Result<Vec<ReleaseInfo>, PendingReleaseError> {
        Ok(self
            .store
            .all()?
            .into_iter()
            .map(|p| p.release)
            .collect())
    }

    /// Live pending entries as candidates, ready to be judged again.
    pub async fn get_pending_candidates(
        &self,
    ) -> Result<Vec<ReleaseCandidate>, PendingReleaseError> {
        Ok(self
            .resolve_pending()
            .await?
            .into_iter()
            .map(|p| p.candidate)
            .collect())
    }

    /// Queue view: one row per episode of every live pending entry.
    pub async fn get_pending_queue(&self) -> Result<Vec<QueueItem>, PendingReleaseError> {
        let now = Utc::now();
        let mut queue = Vec::new();

        for ResolvedPending { pending, candidate } in self.resolve_pending().await? {
            for episode in &candidate.episodes {
                queue.push(QueueItem {
                    id: pending.id,
                    series: candidate.series.clone(),
                    episode: episode.clone(),
                    quality: candidate.parsed.quality,
                    title: pending.title.clone(),
                    size_bytes: pending.release.size_bytes,
                    size_left_bytes: pending.release.size_bytes,
                    time_left: pending.retry_time - now,
                    retry_time: pending.retry_time,
                    status: QueueStatus::Pending,
                });
            }
        }

        Ok(queue)
    }

    /// Submit a pending entry now, ignoring its retry time.
    ///
    /// The entry stays queued; it is cleared by `remove_grabbed` or `remove`.
    pub async fn force_grab(&self, id: i64) -> Result<String, PendingReleaseError> {
        let pending = self
            .store
            .get(id)?
            .ok_or(PendingReleaseError::NotFound(id))?;

        let series = self
            .catalog
            .get_series(pending.series_id)
            .await?
            .ok_or(PendingReleaseError::SeriesNotFound(pending.series_id))?;
        let candidate = self.resolve(&pending, series).await?;

        let result = self.client.submit(&candidate).await;
        metrics::record_external(self.client.name(), "submit", result.is_ok());
        let download_id = result?;

        info!("Force grabbed pending release {}: {}", id, candidate);
        events::emit(
            &self.events,
            SyncEvent::ReleaseGrabbed {
                series_id: candidate.series.id,
                episode_ids: candidate.episodes.iter().map(|e| e.id).collect(),
                title: candidate.release.title.clone(),
                download_id: download_id.clone(),
            },
        );

        Ok(download_id)
    }

    /// Delete an entry unconditionally.
    pub fn remove(&self, id: i64) -> Result<(), PendingReleaseError> {
        if !self.delete(id, "removed")? {
            return Err(PendingReleaseError::NotFound(id));
        }
        Ok(())
    }

    /// Cascade a series deletion to its pending entries.
    pub fn handle_series_deleted(&self, series_id: i32) -> Result<usize, PendingReleaseError> {
        let removed = self.store.delete_by_series(series_id)?;
        if removed > 0 {
            info!(
                "Removed {} pending release(s) of deleted series {}",
                removed, series_id
            );
            metrics::PENDING_QUEUE_CHANGES
                .with_label_values(&["series_deleted"])
                .inc_by(removed as u64);
            events::emit(&self.events, SyncEvent::PendingReleasesUpdated);
        }
        Ok(removed)
    }

    fn delete(&self, id: i64, action: &str) -> Result<bool, PendingReleaseError> {
        let deleted = self.store.delete(id)?;
        if deleted {
            metrics::PENDING_QUEUE_CHANGES
                .with_label_values(&[action])
                .inc();
            events::emit(&self.events, SyncEvent::PendingReleasesUpdated);
        }
        Ok(deleted)
    }

    /// Re-hydrate every stored entry.
    ///
    /// Entries whose series is gone, or that fail to resolve, are skipped so
    /// one bad entry cannot block the rest of the queue.
    async fn resolve_pending(&self) -> Result<Vec<ResolvedPending>, PendingReleaseError> {
        let mut series_cache: HashMap<i32, Option<Series>> = HashMap::new();
        let mut resolved = Vec::new();

        for pending in self.store.all()? {
            let series = match series_cache.get(&pending.series_id) {
                Some(series) => series.clone(),
                None => {
                    let series = match self.catalog.get_series(pending.series_id).await {
                        Ok(series) => series,
                        Err(e) => {
                            warn!(
                                "Unable to load series {} for pending release {}: {}",
                                pending.series_id, pending.id, e
                            );
                            None
                        }
                    };
                    series_cache.insert(pending.series_id, series.clone());
                    series
                }
            };

            let Some(series) = series else {
                debug!(
                    "Skipping pending release {} of missing series {}",
                    pending.id, pending.series_id
                );
                continue;
            };

            match self.resolve(&pending, series).await {
                Ok(candidate) => resolved.push(ResolvedPending { pending, candidate }),
                Err(_) => continue,
            }
        }

        Ok(resolved)
    }

    async fn resolve(
        &self,
        pending: &PendingRelease,
        series: Series,
    ) -> Result<ReleaseCandidate, PendingReleaseError> {
        let episodes = match self.catalog.resolve_episodes(&pending.parsed, &series).await {
            Ok(episodes) => episodes,
            Err(e) => {
                warn!("Unable to resolve episodes for {}: {}", pending.title, e);
                return Err(e.into());
            }
        };

        Ok(ReleaseCandidate {
            release: pending.release.clone(),
            parsed: pending.parsed.clone(),
            series,
            episodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, Episode};
    use crate::download::DownloadError;
    use crate::events::create_event_channel;
    use crate::pending::SqlitePendingReleaseStore;
    use crate::quality::{Quality, QualityModel};
    use crate::testing::{fixtures, MockDownloadClient, MockEpisodeCatalog};
    use chrono::Duration;

    struct Setup {
        catalog: Arc<MockEpisodeCatalog>,
        client: Arc<MockDownloadClient>,
        service: PendingReleaseService,
        series: Series,
        episodes: Vec<Episode>,
    }

    async fn setup() -> Setup {
        let mut profile = fixtures::hd_profile();
        profile.grab_delay_hours = 12;
        let series = fixtures::series(1, profile);
        let episodes = vec![
            fixtures::episode(&series, 1, 1, 1),
            fixtures::episode(&series, 2, 1, 2),
            fixtures::episode(&series, 3, 1, 3),
        ];

        let catalog = Arc::new(MockEpisodeCatalog::new());
        catalog.add_series(series.clone()).await;
        catalog.add_episodes(episodes.clone()).await;

        let client = Arc::new(MockDownloadClient::new());
        let service = PendingReleaseService::new(
            Arc::new(SqlitePendingReleaseStore::in_memory().unwrap()),
            Arc::clone(&catalog) as Arc<dyn EpisodeCatalog>,
            Arc::clone(&client) as Arc<dyn DownloadClient>,
        );

        Setup {
            catalog,
            client,
            service,
            series,
            episodes,
        }
    }

    fn deferred(s: &Setup, episodes: &[usize], quality: Quality) -> DownloadDecision {
        let episodes = episodes.iter().map(|&i| s.episodes[i].clone()).collect();
        let candidate = fixtures::candidate(&s.series, episodes, QualityModel::new(quality));
        DownloadDecision::new(
            candidate,
            vec![crate::decision::Rejection::new(
                "Waiting for better quality release",
                crate::decision::RejectionType::Temporary,
            )],
        )
    }

    #[tokio::test]
    async fn test_add_inserts_with_retry_time() {
        let s = setup().await;
        let decision = deferred(&s, &[0], Quality::Hdtv720p);

        let outcome = s.service.add(&decision).await.unwrap();
        assert!(matches!(outcome, AddOutcome::Inserted { .. }));

        let queue = s.service.get_pending_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue[0].retry_time.timestamp(),
            (decision.candidate.release.publish_date + Duration::hours(12)).timestamp()
        );
    }

    #[tokio::test]
    async fn test_better_quality_replaces_worse() {
        let s = setup().await;

        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        let outcome = s
            .service
            .add(&deferred(&s, &[0], Quality::Webdl720p))
            .await
            .unwrap();
        assert!(matches!(outcome, AddOutcome::Replaced { .. }));

        let queue = s.service.get_pending_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].quality, QualityModel::new(Quality::Webdl720p));
    }

    #[tokio::test]
    async fn test_worse_or_equal_quality_is_discarded() {
        let s = setup().await;

        s.service
            .add(&deferred(&s, &[0], Quality::Webdl720p))
            .await
            .unwrap();

        for quality in [Quality::Hdtv720p, Quality::Webdl720p] {
            let outcome = s.service.add(&deferred(&s, &[0], quality)).await.unwrap();
            assert!(matches!(outcome, AddOutcome::Discarded { .. }));
        }

        let queue = s.service.get_pending_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].quality, QualityModel::new(Quality::Webdl720p));
    }

    #[tokio::test]
    async fn test_partial_overlap_counts_as_same_group() {
        let s = setup().await;

        s.service
            .add(&deferred(&s, &[0, 1], Quality::Hdtv720p))
            .await
            .unwrap();
        let outcome = s
            .service
            .add(&deferred(&s, &[1, 2], Quality::Hdtv720p))
            .await
            .unwrap();

        assert!(matches!(outcome, AddOutcome::Discarded { .. }));
    }

    #[tokio::test]
    async fn test_disjoint_episodes_are_kept_separately() {
        let s = setup().await;

        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        s.service
            .add(&deferred(&s, &[1], Quality::Hdtv720p))
            .await
            .unwrap();

        assert_eq!(s.service.get_pending().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_queue_has_one_row_per_episode() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0, 1], Quality::Hdtv720p))
            .await
            .unwrap();

        let queue = s.service.get_pending_queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, queue[1].id);
        assert_eq!(queue[0].episode.id, 1);
        assert_eq!(queue[1].episode.id, 2);
        for row in &queue {
            assert_eq!(row.size_left_bytes, row.size_bytes);
            assert_eq!(row.status, QueueStatus::Pending);
            assert!(row.time_left > Duration::hours(11));
        }
    }

    #[tokio::test]
    async fn test_overdue_entry_has_negative_time_left() {
        let s = setup().await;
        let mut decision = deferred(&s, &[0], Quality::Hdtv720p);
        decision.candidate.release.publish_date = Utc::now() - Duration::hours(20);
        s.service.add(&decision).await.unwrap();

        let queue = s.service.get_pending_queue().await.unwrap();
        assert!(queue[0].time_left < Duration::zero());
    }

    #[tokio::test]
    async fn test_remove_grabbed_only_touches_overlapping_entries() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        s.service
            .add(&deferred(&s, &[2], Quality::Hdtv720p))
            .await
            .unwrap();

        let grabbed = DownloadDecision::approved(fixtures::candidate(
            &s.series,
            vec![s.episodes[0].clone(), s.episodes[1].clone()],
            QualityModel::new(Quality::Bluray720p),
        ));
        let removed = s.service.remove_grabbed(&[grabbed]).await.unwrap();
        assert_eq!(removed.len(), 1);

        let queue = s.service.get_pending_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].episode.id, 3);
    }

    #[tokio::test]
    async fn test_remove_grabbed_ignores_other_series() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();

        let other = fixtures::series(2, fixtures::hd_profile());
        let grabbed = DownloadDecision::approved(fixtures::candidate(
            &other,
            vec![fixtures::episode(&other, 1, 1, 1)],
            QualityModel::new(Quality::Bluray720p),
        ));

        assert!(s.service.remove_grabbed(&[grabbed]).await.unwrap().is_empty());
        assert_eq!(s.service.get_pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_series_is_skipped() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        s.catalog.remove_series(s.series.id).await;

        assert!(s.service.get_pending_queue().await.unwrap().is_empty());
        assert!(s.service.get_pending_candidates().await.unwrap().is_empty());
        // The raw record is still there until cleaned up.
        assert_eq!(s.service.get_pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_force_grab_submits_and_keeps_entry() {
        let s = setup().await;
        let outcome = s
            .service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        let AddOutcome::Inserted { id } = outcome else {
            panic!("expected insert, got {:?}", outcome);
        };

        let download_id = s.service.force_grab(id).await.unwrap();
        assert!(!download_id.is_empty());

        let submitted = s.client.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].episode_ids(), std::collections::HashSet::from([1]));
        assert_eq!(s.service.get_pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_force_grab_unknown_id() {
        let s = setup().await;
        assert!(matches!(
            s.service.force_grab(99).await,
            Err(PendingReleaseError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_force_grab_surfaces_client_error() {
        let s = setup().await;
        let decision = deferred(&s, &[0], Quality::Hdtv720p);
        let AddOutcome::Inserted { id } = s.service.add(&decision).await.unwrap() else {
            panic!("expected insert");
        };
        s.client
            .fail_title(
                &decision.candidate.release.title,
                DownloadError::Rejected("duplicate".into()),
            )
            .await;

        assert!(matches!(
            s.service.force_grab(id).await,
            Err(PendingReleaseError::Download(DownloadError::Rejected(_)))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let s = setup().await;
        let AddOutcome::Inserted { id } = s
            .service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap()
        else {
            panic!("expected insert");
        };

        s.service.remove(id).unwrap();
        assert!(s.service.get_pending().unwrap().is_empty());
        assert!(matches!(
            s.service.remove(id),
            Err(PendingReleaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_series_deleted_cascades() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        s.service
            .add(&deferred(&s, &[1], Quality::Hdtv720p))
            .await
            .unwrap();

        assert_eq!(s.service.handle_series_deleted(s.series.id).unwrap(), 2);
        assert!(s.service.get_pending().unwrap().is_empty());
    }

    /// Adds a second series (id 2) with one episode and returns a deferred
    /// decision for it.
    async fn deferred_for_other_series(s: &Setup) -> DownloadDecision {
        let other = fixtures::series(2, s.series.profile.clone());
        let episode = fixtures::episode(&other, 201, 1, 1);
        s.catalog.add_series(other.clone()).await;
        s.catalog.add_episodes(vec![episode.clone()]).await;

        DownloadDecision::new(
            fixtures::candidate(&other, vec![episode], Quality::Hdtv720p.into()),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_unresolvable_entry_does_not_block_other_series() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        s.catalog
            .fail_episodes_of(
                s.series.id,
                CatalogError::Unavailable("episode lookup broken".into()),
            )
            .await;

        let other = deferred_for_other_series(&s).await;
        let outcome = s.service.add(&other).await.unwrap();
        assert!(matches!(outcome, AddOutcome::Inserted { .. }));

        // Both rows are stored; only the resolvable one is live.
        assert_eq!(s.service.get_pending().unwrap().len(), 2);
        let candidates = s.service.get_pending_candidates().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].series.id, 2);
        let queue = s.service.get_pending_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].series.id, 2);
        assert_eq!(s.service.remove_grabbed(&[other]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_series_lookup_failure_skips_entry() {
        let s = setup().await;
        s.service
            .add(&deferred(&s, &[0], Quality::Hdtv720p))
            .await
            .unwrap();
        let other = deferred_for_other_series(&s).await;
        s.service.add(&other).await.unwrap();

        s.catalog
            .set_next_error(CatalogError::Unavailable("timeout".into()))
            .await;

        let candidates = s.service.get_pending_candidates().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].series.id, 2);
    }

    #[tokio::test]
    async fn test_mutations_emit_updates() {
        let s = setup().await;
        let (handle, mut rx) = create_event_channel(16);
        let service = s.service.with_events(handle);
        let series = s.series.clone();
        let episode = s.episodes[0].clone();

        let low = DownloadDecision::new(
            fixtures::candidate(&series, vec![episode.clone()], Quality::Hdtv720p.into()),
            vec![],
        );
        let high = DownloadDecision::new(
            fixtures::candidate(&series, vec![episode], Quality::Webdl720p.into()),
            vec![],
        );
        service.add(&low).await.unwrap();
        service.add(&high).await.unwrap();

        // insert, then delete + insert
        for _ in 0..3 {
            let envelope = rx.try_recv().unwrap();
            assert_eq!(envelope.event, SyncEvent::PendingReleasesUpdated);
        }
        assert!(rx.try_recv().is_err());
    }
}
