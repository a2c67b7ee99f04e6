//! Summary statistics for a cycle recommendation

use crate::scorer::round_to;
use crate::PriorityEntry;

/// Fraction of the current wait expected after optimization
const OPTIMIZED_WAIT_RATIO: f64 = 0.75;

const CONFIDENCE_FLOOR: f64 = 0.5;
const CONFIDENCE_CAP: f64 = 0.95;

/// Mean vehicle count that adds 1.0 to confidence
const CONFIDENCE_VOLUME_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Percentage, one decimal
    pub expected_improvement: f64,
    /// Two decimals, in [0.5, 0.95]
    pub confidence: f64,
}

/// Expected improvement and confidence for scored entries.
///
/// Improvement is a flat 25% of the current estimated wait, so it is 25.0
/// whenever any queue is non-zero and 0.0 when every queue is empty.
pub fn summarize(entries: &[PriorityEntry]) -> Summary {
    if entries.is_empty() {
        return Summary {
            expected_improvement: 0.0,
            confidence: CONFIDENCE_FLOOR,
        };
    }
    let n = entries.len() as f64;

    // Wait is 2·queue and scales out of the ratio; no division keeps tiny
    // queues from underflowing to zero.
    let any_queue = entries.iter().any(|e| e.queue_length > 0.0);
    let expected_improvement = if any_queue {
        round_to((1.0 - OPTIMIZED_WAIT_RATIO) * 100.0, 1)
    } else {
        0.0
    };

    let avg_vehicle_count = entries.iter().map(|e| e.vehicle_count as f64).sum::<f64>() / n;
    let confidence = round_to(
        CONFIDENCE_CAP.min(CONFIDENCE_FLOOR + avg_vehicle_count / CONFIDENCE_VOLUME_SCALE),
        2,
    );

    Summary {
        expected_improvement,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(vehicle_count: u32, queue_length: f64) -> PriorityEntry {
        PriorityEntry {
            direction: "N".to_string(),
            priority: 1.0,
            vehicle_count,
            queue_length,
        }
    }

    #[test]
    fn test_improvement_is_flat_quarter() {
        let summary = summarize(&[entry(10, 5.0), entry(2, 1.0)]);
        assert_eq!(summary.expected_improvement, 25.0);

        let summary = summarize(&[entry(0, 0.3), entry(0, 0.0)]);
        assert_eq!(summary.expected_improvement, 25.0);
    }

    #[test]
    fn test_subnormal_queue_still_improves() {
        let summary = summarize(&[entry(0, 5e-324), entry(0, 0.0), entry(0, 0.0), entry(0, 0.0)]);
        assert_eq!(summary.expected_improvement, 25.0);
    }

    #[test]
    fn test_empty_queues_report_no_improvement() {
        let summary = summarize(&[entry(12, 0.0), entry(3, 0.0)]);
        assert_eq!(summary.expected_improvement, 0.0);
        assert!(summary.expected_improvement.is_finite());
    }

    #[test]
    fn test_confidence_tracks_volume() {
        // mean 6 → 0.56
        assert_eq!(summarize(&[entry(10, 5.0), entry(2, 1.0)]).confidence, 0.56);
        assert_eq!(summarize(&[entry(0, 5.0)]).confidence, 0.5);
        assert_eq!(summarize(&[entry(30, 5.0)]).confidence, 0.8);
    }

    #[test]
    fn test_confidence_caps() {
        assert_eq!(summarize(&[entry(45, 1.0)]).confidence, 0.95);
        assert_eq!(summarize(&[entry(400, 1.0), entry(90, 1.0)]).confidence, 0.95);
    }

    #[test]
    fn test_empty_entries() {
        let summary = summarize(&[]);
        assert_eq!(summary.expected_improvement, 0.0);
        assert_eq!(summary.confidence, 0.5);
    }
}
