//! User-facing status badge.
//!
//! The session records the status of the last operation so any client can
//! render the same badge text.

use std::fmt;

use semadepth_core::policy::CONFIDENCE_THRESHOLD;
use serde::Serialize;

use crate::error::SessionError;

const BADGE_PREFIX: &str = "▶ ";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// Nothing has happened yet.
    Idle,
    CalibratedUsing { label: String },
    CalibrationFailed,
    /// An upload was attempted before calibration.
    CompleteCalibrationFirst,
    DetectionFailed,
    ReadyToMeasure,
    /// A tap was attempted before calibration.
    CalibrateFirst,
    NoHit,
    LowConfidence { confidence: f64 },
    AnchorOnly,
    TargetLocked { label: String },
    ExperimentalEstimate { label: String },
    MeasurementError,
}

impl Status {
    /// Badge text without the leading marker.
    pub fn text(&self) -> String {
        match self {
            Self::Idle => "AWAITING CALIBRATION".to_string(),
            Self::CalibratedUsing { label } => {
                format!("CALIBRATED USING: {}", label.to_uppercase())
            }
            Self::CalibrationFailed => "CALIBRATION FAILED".to_string(),
            Self::CompleteCalibrationFirst => "COMPLETE CALIBRATION FIRST".to_string(),
            Self::DetectionFailed => "DETECTION FAILED".to_string(),
            Self::ReadyToMeasure => "TAP OBJECT TO MEASURE DISTANCE".to_string(),
            Self::CalibrateFirst => "CALIBRATE FOCAL CONSTANT FIRST".to_string(),
            Self::NoHit => "CLICK INSIDE A DETECTED BOUNDING BOX".to_string(),
            Self::LowConfidence { confidence } => format!(
                "LOW CONFIDENCE {:.1}% (<{:.0}%)",
                confidence * 100.0,
                CONFIDENCE_THRESHOLD * 100.0
            ),
            Self::AnchorOnly => "ACCURATE MODE: ANCHOR OBJECTS ONLY".to_string(),
            Self::TargetLocked { label } => format!("TARGET LOCKED: {}", label.to_uppercase()),
            Self::ExperimentalEstimate { label } => {
                format!("EXPERIMENTAL ESTIMATE: {}", label.to_uppercase())
            }
            Self::MeasurementError => "MEASUREMENT ERROR".to_string(),
        }
    }

    /// Status shown after an operation failed with `err`.
    pub fn for_error(err: &SessionError) -> Self {
        match err {
            SessionError::NotCalibrated => Self::CalibrateFirst,
            SessionError::DimensionsUnavailable { .. } | SessionError::MeasurementService(_) => {
                Self::MeasurementError
            }
            SessionError::DetectionService(_) => Self::DetectionFailed,
            SessionError::CalibrationService(_) | SessionError::InvalidCalibration(_) => {
                Self::CalibrationFailed
            }
            SessionError::UnknownDetection(_) => Self::NoHit,
            SessionError::Validation(_) => Self::MeasurementError,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BADGE_PREFIX}{}", self.text())
    }
}
