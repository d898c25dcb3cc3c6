//! Search-scope rule: during a targeted search only the searched series is
//! acceptable.

use async_trait::async_trait;
use tracing::trace;

use crate::release::ReleaseCandidate;

use super::{DecisionSpecification, RejectionType, SearchCriteria};

#[derive(Debug, Default)]
pub struct SeriesSpecification;

impl SeriesSpecification {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecisionSpecification for SeriesSpecification {
    fn name(&self) -> &'static str {
        "series"
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn rejection_reason(&self) -> &'static str {
        "Wrong series"
    }

    async fn is_satisfied_by(
        &self,
        candidate: &ReleaseCandidate,
        criteria: Option<&SearchCriteria>,
    ) -> bool {
        let Some(criteria) = criteria else {
            return true;
        };

        trace!("Checking if series matches searched series");

        if candidate.series.id != criteria.series_id {
            trace!(
                "Series {} does not match {}",
                candidate.series.id,
                criteria.series_id
            );
            return false;
        }

        true
    }
}
