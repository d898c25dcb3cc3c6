//! Deterministic ordering of approved decisions.

use std::cmp::Ordering;

use crate::decision::DownloadDecision;
use crate::quality::QualityComparer;

/// Order decisions so the most desirable release for each series comes first.
///
/// Decisions are grouped by series (groups keep the order in which each
/// series first appears). Within a series: higher quality first, then more
/// episodes covered, then lower first episode number, then the freshest
/// release. The sort is stable, so full ties keep their input order.
pub fn prioritize_decisions(decisions: Vec<DownloadDecision>) -> Vec<DownloadDecision> {
    let mut groups: Vec<(i32, Vec<DownloadDecision>)> = Vec::new();

    for decision in decisions {
        let series_id = decision.candidate.series.id;
        match groups.iter_mut().find(|(id, _)| *id == series_id) {
            Some((_, group)) => group.push(decision),
            None => groups.push((series_id, vec![decision])),
        }
    }

    groups
        .into_iter()
        .flat_map(|(_, mut group)| {
            let profile = group[0].candidate.series.profile.clone();
            let comparer = QualityComparer::new(&profile);
            group.sort_by(|a, b| compare_within_series(&comparer, a, b));
            group
        })
        .collect()
}

fn compare_within_series(
    comparer: &QualityComparer<'_>,
    a: &DownloadDecision,
    b: &DownloadDecision,
) -> Ordering {
    let (a, b) = (&a.candidate, &b.candidate);

    comparer
        .compare(b.quality(), a.quality())
        .then_with(|| b.episodes.len().cmp(&a.episodes.len()))
        .then_with(|| first_episode_number(a).cmp(&first_episode_number(b)))
        .then_with(|| b.release.publish_date.cmp(&a.release.publish_date))
}

fn first_episode_number(candidate: &crate::release::ReleaseCandidate) -> u32 {
    candidate
        .episodes
        .iter()
        .map(|e| e.episode_number)
        .min()
        .unwrap_or(0)
}
