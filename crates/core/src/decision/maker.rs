//! Runs the fixed specification chain over candidates.

use std::sync::Arc;

use tracing::debug;

use crate::download::{DownloadHistory, DownloadTracker};
use crate::metrics;
use crate::release::ReleaseCandidate;

use super::{
    DecisionError, DecisionSpecification, DelaySpecification, DownloadDecision,
    NotInQueueSpecification, Rejection, SearchCriteria, SeriesSpecification,
};

/// The decision engine.
///
/// Every specification is evaluated for every candidate so a decision
/// reports all applicable rejections.
pub struct DecisionMaker {
    specifications: Vec<Arc<dyn DecisionSpecification>>,
}

impl DecisionMaker {
    /// Build an engine over an explicit, ordered set of specifications.
    pub fn new(specifications: Vec<Arc<dyn DecisionSpecification>>) -> Self {
        Self { specifications }
    }

    /// The standard chain: duplicate suppression, grab delay, search scope.
    pub fn standard(tracker: Arc<dyn DownloadTracker>, history: Arc<dyn DownloadHistory>) -> Self {
        Self::new(vec![
            Arc::new(NotInQueueSpecification::new(tracker)),
            Arc::new(DelaySpecification::new(history)),
            Arc::new(SeriesSpecification::new()),
        ])
    }

    /// Decisions for unattended (RSS) discovery.
    pub async fn rss_decisions(
        &self,
        candidates: Vec<ReleaseCandidate>,
    ) -> Result<Vec<DownloadDecision>, DecisionError> {
        self.decisions(candidates, None).await
    }

    /// Decisions for a targeted search.
    pub async fn search_decisions(
        &self,
        candidates: Vec<ReleaseCandidate>,
        criteria: &SearchCriteria,
    ) -> Result<Vec<DownloadDecision>, DecisionError> {
        self.decisions(candidates, Some(criteria)).await
    }

    async fn decisions(
        &self,
        candidates: Vec<ReleaseCandidate>,
        criteria: Option<&SearchCriteria>,
    ) -> Result<Vec<DownloadDecision>, DecisionError> {
        let mut decisions = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            decisions.push(self.decide(candidate, criteria).await?);
        }

        Ok(decisions)
    }

    async fn decide(
        &self,
        candidate: ReleaseCandidate,
        criteria: Option<&SearchCriteria>,
    ) -> Result<DownloadDecision, DecisionError> {
        candidate
            .series
            .profile
            .validate()
            .map_err(|source| DecisionError::InvalidProfile {
                series_id: candidate.series.id,
                source,
            })?;

        let mut rejections = Vec::new();

        for spec in &self.specifications {
            if !spec.is_satisfied_by(&candidate, criteria).await {
                let kind = spec.rejection_type();
                metrics::DECISION_REJECTIONS
                    .with_label_values(&[spec.name(), kind.as_str()])
                    .inc();
                rejections.push(Rejection::new(spec.rejection_reason(), kind));
            }
        }

        if rejections.is_empty() {
            debug!("Release accepted: {}", candidate);
        } else {
            debug!(
                "Release rejected for the following reasons: {}",
                rejections
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(DownloadDecision::new(candidate, rejections))
    }
}
