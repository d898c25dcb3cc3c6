//! Grab-delay rule: hold back non-optimal releases found by RSS until
//! they are old enough that nothing better is likely to show up.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::download::DownloadHistory;
use crate::quality::{GrabDelayMode, QualityComparer, QualityModel};
use crate::release::ReleaseCandidate;

use super::{DecisionSpecification, RejectionType, SearchCriteria};

pub struct DelaySpecification {
    history: Arc<dyn DownloadHistory>,
}

impl DelaySpecification {
    pub fn new(history: Arc<dyn DownloadHistory>) -> Self {
        Self { history }
    }

    /// A proper of the exact quality already downloaded for any episode.
    async fn is_proper_upgrade(&self, candidate: &ReleaseCandidate) -> bool {
        let profile = &candidate.series.profile;
        let comparer = QualityComparer::new(profile);
        let quality = candidate.quality();

        for episode in &candidate.episodes {
            let best = match self.history.best_quality_downloaded(profile, episode.id).await {
                Ok(best) => best,
                Err(e) => {
                    warn!("Unable to read history for episode {}: {}", episode.id, e);
                    None
                }
            };

            let Some(best) = best else {
                continue;
            };

            if comparer.outranks(quality, &best)
                && quality.quality == best.quality
                && quality.proper > best.proper
            {
                return true;
            }
        }

        false
    }
}

#[async_trait]
impl DecisionSpecification for DelaySpecification {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Temporary
    }

    fn rejection_reason(&self) -> &'static str {
        "Waiting for better quality release"
    }

    async fn is_satisfied_by(
        &self,
        candidate: &ReleaseCandidate,
        criteria: Option<&SearchCriteria>,
    ) -> bool {
        if criteria.is_some() {
            debug!("Ignore delay for searches");
            return true;
        }

        let profile = &candidate.series.profile;

        if profile.grab_delay_hours == 0 {
            debug!("Profile does not delay before download");
            return true;
        }

        let comparer = QualityComparer::new(profile);
        let quality = candidate.quality();

        if quality.proper && self.is_proper_upgrade(candidate).await {
            debug!("New quality is a proper for existing quality, skipping delay");
            return true;
        }

        // Profiles are validated before evaluation, so these always exist.
        let (Some(best), Some(worst)) = (profile.best_allowed(), profile.worst_allowed()) else {
            return true;
        };

        if comparer.meets_or_exceeds(quality, &best) {
            debug!("Quality is highest in profile, will not delay");
            return true;
        }

        if profile.grab_delay_mode == GrabDelayMode::Cutoff
            && comparer.meets_or_exceeds(quality, &QualityModel::new(profile.cutoff))
        {
            debug!("Quality meets or exceeds the cutoff, will not delay");
            return true;
        }

        if profile.grab_delay_mode == GrabDelayMode::First
            && comparer.outranks(quality, &worst)
            && quality.quality != worst.quality
        {
            debug!("Quality is not lowest in profile, will not delay");
            return true;
        }

        let age = candidate.release.age_at(Utc::now());
        if age < profile.grab_delay() {
            debug!(
                "Age ({}h) is less than delay {}h, delaying",
                age.num_hours(),
                profile.grab_delay_hours
            );
            return false;
        }

        true
    }
}
