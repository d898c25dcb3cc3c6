//! Duplicate-suppression rule: reject a release when an active download
//! already covers any of its episodes at equal or better quality.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::download::{DownloadTracker, TrackedDownload};
use crate::quality::QualityComparer;
use crate::release::ReleaseCandidate;

use super::{DecisionSpecification, RejectionType, SearchCriteria};

/// Checks the live download queue on every evaluation.
///
/// Overlap is any shared episode, not full coverage: one tracked item
/// covering a single episode of a multi-episode release is enough to
/// block it.
pub struct NotInQueueSpecification {
    tracker: Arc<dyn DownloadTracker>,
}

impl NotInQueueSpecification {
    pub fn new(tracker: Arc<dyn DownloadTracker>) -> Self {
        Self { tracker }
    }

    fn is_in_queue(candidate: &ReleaseCandidate, queue: &[TrackedDownload]) -> bool {
        let comparer = QualityComparer::new(&candidate.series.profile);
        let episode_ids = candidate.episode_ids();

        queue
            .iter()
            .filter(|t| !t.state.is_failed())
            .filter(|t| t.series_id == candidate.series.id)
            .filter(|t| t.episode_ids.iter().any(|id| episode_ids.contains(id)))
            .any(|t| comparer.meets_or_exceeds(&t.quality, candidate.quality()))
    }
}

#[async_trait]
impl DecisionSpecification for NotInQueueSpecification {
    fn name(&self) -> &'static str {
        "not_in_queue"
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Temporary
    }

    fn rejection_reason(&self) -> &'static str {
        "Already in download queue"
    }

    async fn is_satisfied_by(
        &self,
        candidate: &ReleaseCandidate,
        _criteria: Option<&SearchCriteria>,
    ) -> bool {
        let queue = match self.tracker.currently_tracked().await {
            Ok(queue) => queue,
            Err(e) => {
                warn!("Unable to check download queue for {}: {}", candidate, e);
                return false;
            }
        };

        if Self::is_in_queue(candidate, &queue) {
            debug!("Already in queue, rejecting {}", candidate);
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Episode, Series};
    use crate::download::{DownloadError, TrackedDownloadState};
    use crate::quality::{Quality, QualityModel};
    use crate::testing::{fixtures, MockDownloadTracker};

    struct Setup {
        series: Series,
        episode: Episode,
        other_episode: Episode,
        tracker: Arc<MockDownloadTracker>,
        spec: NotInQueueSpecification,
    }

    fn setup() -> Setup {
        let series = fixtures::series(1, fixtures::default_profile());
        let episode = fixtures::episode(&series, 1, 1, 1);
        let other_episode = fixtures::episode(&series, 2, 2, 2);
        let tracker = Arc::new(MockDownloadTracker::new());
        let spec = NotInQueueSpecification::new(Arc::clone(&tracker) as Arc<dyn DownloadTracker>);

        Setup {
            series,
            episode,
            other_episode,
            tracker,
            spec,
        }
    }

    fn dvd_candidate(s: &Setup, episodes: Vec<Episode>) -> ReleaseCandidate {
        fixtures::candidate(&s.series, episodes, QualityModel::new(Quality::Dvd))
    }

    #[tokio::test]
    async fn test_true_when_queue_is_empty() {
        let s = setup();
        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_true_when_series_doesnt_match() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(2, &[s.episode.id], Quality::Dvd.into())])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_true_when_download_is_failed() {
        let s = setup();
        let mut tracked = fixtures::tracked(s.series.id, &[s.episode.id], Quality::Dvd.into());
        tracked.state = TrackedDownloadState::DownloadFailed;
        s.tracker.set_queue(vec![tracked]).await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_true_when_quality_in_queue_is_lower() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(s.series.id, &[s.episode.id], Quality::Sdtv.into())])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_true_when_episode_doesnt_match() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(
                s.series.id,
                &[s.other_episode.id],
                Quality::Dvd.into(),
            )])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_false_when_qualities_are_the_same() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(s.series.id, &[s.episode.id], Quality::Dvd.into())])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_false_when_quality_in_queue_is_better() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(
                s.series.id,
                &[s.episode.id],
                Quality::Hdtv720p.into(),
            )])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_false_if_matching_multi_episode_is_in_queue() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(
                s.series.id,
                &[s.episode.id, s.other_episode.id],
                Quality::Hdtv720p.into(),
            )])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_false_if_multi_episode_has_one_episode_in_queue() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(
                s.series.id,
                &[s.episode.id],
                Quality::Hdtv720p.into(),
            )])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone(), s.other_episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_false_if_multi_part_episode_is_already_in_queue() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(
                s.series.id,
                &[s.episode.id, s.other_episode.id],
                Quality::Hdtv720p.into(),
            )])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone(), s.other_episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_false_if_multi_part_episode_has_two_episodes_in_queue() {
        let s = setup();
        s.tracker
            .set_queue(vec![
                fixtures::tracked(s.series.id, &[s.episode.id], Quality::Hdtv720p.into()),
                fixtures::tracked(s.series.id, &[s.other_episode.id], Quality::Hdtv720p.into()),
            ])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone(), s.other_episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
    }

    #[tokio::test]
    async fn test_suppression_is_monotonic_in_quality() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(s.series.id, &[s.episode.id], Quality::Dvd.into())])
            .await;

        for (quality, expected) in [
            (Quality::Sdtv, false),
            (Quality::Dvd, false),
            (Quality::Hdtv720p, true),
            (Quality::Bluray1080p, true),
        ] {
            let candidate =
                fixtures::candidate(&s.series, vec![s.episode.clone()], quality.into());
            assert_eq!(
                s.spec.is_satisfied_by(&candidate, None).await,
                expected,
                "quality {}",
                quality
            );
        }
    }

    #[tokio::test]
    async fn test_proper_in_queue_blocks_non_proper_candidate() {
        let s = setup();
        s.tracker
            .set_queue(vec![fixtures::tracked(
                s.series.id,
                &[s.episode.id],
                QualityModel::proper(Quality::Dvd),
            )])
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);

        let proper = fixtures::candidate(
            &s.series,
            vec![s.episode.clone()],
            QualityModel::proper(Quality::Dvd),
        );
        assert!(!s.spec.is_satisfied_by(&proper, None).await);
    }

    #[tokio::test]
    async fn test_tracker_failure_rejects_temporarily() {
        let s = setup();
        s.tracker
            .set_next_error(DownloadError::ConnectionFailed("refused".into()))
            .await;

        let candidate = dvd_candidate(&s, vec![s.episode.clone()]);
        assert!(!s.spec.is_satisfied_by(&candidate, None).await);
        assert_eq!(s.spec.rejection_type(), RejectionType::Temporary);

        // Error is consumed; next evaluation sees the empty queue.
        assert!(s.spec.is_satisfied_by(&candidate, None).await);
    }
}
