//! Gating checks that run before a tapped detection is measured.
//!
//! A refusal here is an informational outcome, not an error.

use serde::{Deserialize, Serialize};

use crate::detection::Detection;

/// Detections below this confidence are never measured.
pub const CONFIDENCE_THRESHOLD: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PolicyDecision {
    Allowed,
    LowConfidence { confidence: f64 },
    /// Accurate mode is on and the detection is not an anchor object.
    AnchorOnly,
}

/// Evaluate the low-confidence guard first, then accurate mode.
pub fn check_measurable(detection: &Detection, accurate_mode: bool) -> PolicyDecision {
    if detection.confidence < CONFIDENCE_THRESHOLD {
        return PolicyDecision::LowConfidence {
            confidence: detection.confidence,
        };
    }
    if accurate_mode && !detection.is_anchor() {
        return PolicyDecision::AnchorOnly;
    }
    PolicyDecision::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn det(confidence: f64, anchor: Option<f64>) -> Detection {
        let bbox = BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0).unwrap();
        Detection::new(0, "thing", confidence, bbox, anchor).unwrap()
    }

    #[test]
    fn low_confidence_checked_before_accurate_mode() {
        assert_eq!(
            check_measurable(&det(0.42, None), true),
            PolicyDecision::LowConfidence { confidence: 0.42 }
        );
    }

    #[test]
    fn threshold_itself_is_allowed() {
        assert_eq!(check_measurable(&det(0.55, Some(75.0)), true), PolicyDecision::Allowed);
    }

    #[test]
    fn accurate_mode_refuses_heuristic_objects() {
        assert_eq!(check_measurable(&det(0.9, None), true), PolicyDecision::AnchorOnly);
        assert_eq!(check_measurable(&det(0.9, None), false), PolicyDecision::Allowed);
    }
}
