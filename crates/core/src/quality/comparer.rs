//! Profile-aware ordering of quality models.

use std::cmp::Ordering;

use super::{QualityModel, QualityProfile};

/// Orders [`QualityModel`]s by their position in a profile, then by the
/// proper flag.
///
/// Qualities missing from the profile rank below every listed quality.
#[derive(Debug, Clone, Copy)]
pub struct QualityComparer<'a> {
    profile: &'a QualityProfile,
}

impl<'a> QualityComparer<'a> {
    pub fn new(profile: &'a QualityProfile) -> Self {
        Self { profile }
    }

    pub fn compare(&self, left: &QualityModel, right: &QualityModel) -> Ordering {
        let left_index = self.profile.index_of(left.quality);
        let right_index = self.profile.index_of(right.quality);

        left_index
            .cmp(&right_index)
            .then_with(|| left.proper.cmp(&right.proper))
    }

    /// `left` ranks at or above `right`.
    pub fn meets_or_exceeds(&self, left: &QualityModel, right: &QualityModel) -> bool {
        self.compare(left, right) != Ordering::Less
    }

    /// `left` ranks strictly above `right`.
    pub fn outranks(&self, left: &QualityModel, right: &QualityModel) -> bool {
        self.compare(left, right) == Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{GrabDelayMode, ProfileQualityItem, Quality};

    fn profile() -> QualityProfile {
        QualityProfile {
            id: 1,
            name: "HD".to_string(),
            items: vec![
                ProfileQualityItem::allowed(Quality::Sdtv),
                ProfileQualityItem::disallowed(Quality::Dvd),
                ProfileQualityItem::allowed(Quality::Hdtv720p),
                ProfileQualityItem::allowed(Quality::Bluray720p),
            ],
            cutoff: Quality::Hdtv720p,
            grab_delay_hours: 0,
            grab_delay_mode: GrabDelayMode::Always,
        }
    }

    #[test]
    fn test_profile_position_is_primary_key() {
        let p = profile();
        let comparer = QualityComparer::new(&p);

        assert_eq!(
            comparer.compare(
                &QualityModel::new(Quality::Bluray720p),
                &QualityModel::new(Quality::Hdtv720p)
            ),
            Ordering::Greater
        );
        assert_eq!(
            comparer.compare(
                &QualityModel::new(Quality::Sdtv),
                &QualityModel::new(Quality::Dvd)
            ),
            Ordering::Less
        );
    }

    #[test]
    fn test_proper_breaks_ties_within_same_quality() {
        let p = profile();
        let comparer = QualityComparer::new(&p);

        assert_eq!(
            comparer.compare(
                &QualityModel::proper(Quality::Hdtv720p),
                &QualityModel::new(Quality::Hdtv720p)
            ),
            Ordering::Greater
        );
        assert_eq!(
            comparer.compare(
                &QualityModel::new(Quality::Hdtv720p),
                &QualityModel::new(Quality::Hdtv720p)
            ),
            Ordering::Equal
        );
    }

    #[test]
    fn test_proper_does_not_beat_higher_quality() {
        let p = profile();
        let comparer = QualityComparer::new(&p);

        assert!(comparer.outranks(
            &QualityModel::new(Quality::Bluray720p),
            &QualityModel::proper(Quality::Hdtv720p)
        ));
    }

    #[test]
    fn test_absent_quality_ranks_lowest() {
        let p = profile();
        let comparer = QualityComparer::new(&p);

        assert!(comparer.outranks(
            &QualityModel::new(Quality::Sdtv),
            &QualityModel::new(Quality::Bluray1080p)
        ));
        assert_eq!(
            comparer.compare(
                &QualityModel::new(Quality::Bluray1080p),
                &QualityModel::new(Quality::Webdl1080p)
            ),
            Ordering::Equal
        );
    }

    #[test]
    fn test_meets_or_exceeds() {
        let p = profile();
        let comparer = QualityComparer::new(&p);
        let hdtv = QualityModel::new(Quality::Hdtv720p);

        assert!(comparer.meets_or_exceeds(&hdtv, &hdtv));
        assert!(!comparer.meets_or_exceeds(&QualityModel::new(Quality::Sdtv), &hdtv));
    }
}
