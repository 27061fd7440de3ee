//! Communication quality scoring for per-entity telegram counters.

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::model::Stat;

/// Quality at or above this (but below 100) is degraded rather than poor.
/// Occasional transient bus errors are normal.
pub const DEGRADED_THRESHOLD: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QualityTier {
    Excellent,
    Degraded,
    Poor,
}

/// A quality reading worth rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality {
    pub percent: u8,
    pub tier: QualityTier,
}

/// Score one entity's counters.
///
/// Returns `None` when the entity has never been exercised (0% quality
/// with zero attempts), so no misleading 0% is shown. A 0% reading with
/// attempts on record is a real, poor result.
pub fn score(success_count: u64, fail_count: u64, quality_percent: u8) -> Option<Quality> {
    if quality_percent == 0 && success_count.saturating_add(fail_count) == 0 {
        return None;
    }
    let tier = match quality_percent {
        100.. => QualityTier::Excellent,
        DEGRADED_THRESHOLD..=99 => QualityTier::Degraded,
        _ => QualityTier::Poor,
    };
    Some(Quality {
        percent: quality_percent,
        tier,
    })
}

/// Score a [`Stat`].
pub fn score_stat(stat: &Stat) -> Option<Quality> {
    score(stat.success_count, stat.fail_count, stat.quality_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(s: u64, f: u64, q: u8) -> Option<QualityTier> {
        score(s, f, q).map(|q| q.tier)
    }

    #[test]
    fn never_exercised_renders_nothing() {
        assert_eq!(score(0, 0, 0), None);
    }

    #[test]
    fn zero_quality_with_attempts_is_poor() {
        assert_eq!(tier(1, 9, 0), Some(QualityTier::Poor));
        assert_eq!(tier(0, 4, 0), Some(QualityTier::Poor));
        assert_eq!(tier(3, 0, 0), Some(QualityTier::Poor));
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier(100, 0, 100), Some(QualityTier::Excellent));
        assert_eq!(tier(96, 4, 96), Some(QualityTier::Degraded));
        assert_eq!(tier(95, 5, 95), Some(QualityTier::Degraded));
        assert_eq!(tier(94, 6, 94), Some(QualityTier::Poor));
        assert_eq!(tier(99, 1, 99), Some(QualityTier::Degraded));
    }

    #[test]
    fn nonzero_quality_without_attempts_still_renders() {
        // Only the 0/0/0 combination is suppressed.
        assert_eq!(tier(0, 0, 100), Some(QualityTier::Excellent));
        assert_eq!(tier(0, 0, 50), Some(QualityTier::Poor));
    }

    #[test]
    fn percent_is_carried_through() {
        let q = score(998, 2, 99).expect("rendered");
        assert_eq!(q.percent, 99);
    }
}
