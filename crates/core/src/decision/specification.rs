//! The capability shared by every rule in the decision chain.

use async_trait::async_trait;

use crate::release::ReleaseCandidate;

use super::{RejectionType, SearchCriteria};

/// One rule in the fixed decision chain.
///
/// Evaluation is total: a rule always answers, falling back to its own
/// verdict when a collaborator fails.
#[async_trait]
pub trait DecisionSpecification: Send + Sync {
    /// Rule name for logging and metrics.
    fn name(&self) -> &'static str;

    /// Severity attached to a rejection from this rule.
    fn rejection_type(&self) -> RejectionType;

    /// Human-readable rejection reason.
    fn rejection_reason(&self) -> &'static str;

    async fn is_satisfied_by(
        &self,
        candidate: &ReleaseCandidate,
        criteria: Option<&SearchCriteria>,
    ) -> bool;
}
