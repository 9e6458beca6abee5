//! Calibration state machine for the focal constant.
//!
//! `Uncalibrated -> Calibrated(guided | manual)`. Once calibrated the
//! session never becomes uncalibrated again; each successful calibration
//! simply overwrites the constant and its source.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Focal constant in effect before any calibration.
pub const DEFAULT_FOCAL_CONSTANT: f64 = 1400.0;
/// Lowest focal constant accepted from the manual control.
pub const MIN_FOCAL_CONSTANT: f64 = 50.0;
/// Highest focal constant accepted from the manual control.
pub const MAX_FOCAL_CONSTANT: f64 = 10000.0;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationSource {
    None,
    Manual,
    Guided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub is_calibrated: bool,
    pub focal_constant: f64,
    pub source: CalibrationSource,
    /// Label of the reference object used by the last guided calibration.
    pub calibration_object: String,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            is_calibrated: false,
            focal_constant: DEFAULT_FOCAL_CONSTANT,
            source: CalibrationSource::None,
            calibration_object: String::new(),
        }
    }
}

impl CalibrationState {
    /// Apply a constant fitted by the guided-calibration service.
    pub fn apply_guided(
        &mut self,
        fitted_constant: f64,
        used_label: &str,
    ) -> Result<(), CoreError> {
        if !fitted_constant.is_finite() || fitted_constant <= 0.0 {
            return Err(CoreError::Calibration(format!(
                "fitted focal constant must be positive, got {fitted_constant}"
            )));
        }
        self.is_calibrated = true;
        self.focal_constant = fitted_constant;
        self.source = CalibrationSource::Guided;
        self.calibration_object = used_label.to_string();
        Ok(())
    }

    /// Apply a constant set directly by the user. The reference object of
    /// any earlier guided calibration is left untouched.
    pub fn apply_manual(&mut self, constant: f64) -> Result<(), CoreError> {
        if !(MIN_FOCAL_CONSTANT..=MAX_FOCAL_CONSTANT).contains(&constant) {
            return Err(CoreError::Validation(format!(
                "focal constant must be between {MIN_FOCAL_CONSTANT} and {MAX_FOCAL_CONSTANT}, got {constant}"
            )));
        }
        self.is_calibrated = true;
        self.focal_constant = constant;
        self.source = CalibrationSource::Manual;
        Ok(())
    }

    /// Guard for every upload and measurement entry point.
    pub fn require_calibrated(&self) -> Result<(), CoreError> {
        if self.is_calibrated {
            Ok(())
        } else {
            Err(CoreError::NotCalibrated)
        }
    }

    /// Text shown once calibrated, e.g. `Calibrated using: mouse. Ready to measure.`
    pub fn summary(&self) -> String {
        if !self.is_calibrated {
            return "Calibration required: hold any object approximately 1 foot away \
                    (about forearm length), take a photo, then upload it here."
                .to_string();
        }
        let object = if self.calibration_object.is_empty() {
            "object"
        } else {
            self.calibration_object.as_str()
        };
        format!("Calibrated using: {object}. Ready to measure.")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
