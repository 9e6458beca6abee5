//! Measurement records and their display reconstruction.

use serde::{Deserialize, Serialize};

use crate::detection::Detection;
use crate::reference_width::EstimateMode;
use crate::session_log::SessionLogEntry;
use crate::types::Timestamp;
use crate::units::DistanceUnit;

/// Result of one distance measurement. Holds the detection by value so later
/// batches cannot change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub detection: Detection,
    pub reference_width_mm: f64,
    pub distance_m: f64,
    pub estimate_mode: EstimateMode,
    /// Focal constant the distance was computed with.
    pub focal_constant: f64,
}

impl Measurement {
    pub fn pixel_width(&self) -> f64 {
        self.detection.bbox.width
    }

    pub fn to_log_entry(&self, timestamp: Timestamp) -> SessionLogEntry {
        SessionLogEntry {
            label: self.detection.label.clone(),
            confidence: self.detection.confidence,
            real_width_mm: self.reference_width_mm,
            distance_m: self.distance_m,
            focal_constant: self.focal_constant,
            estimate_mode: self.estimate_mode,
            timestamp,
        }
    }

    pub fn view(&self, unit: DistanceUnit) -> MeasurementView {
        MeasurementView {
            label: self.detection.label.to_uppercase(),
            confidence: format!("{:.1}%", self.detection.confidence * 100.0),
            distance: unit.format_value(self.distance_m),
            unit_caption: unit.caption().to_string(),
            reference_width: format!("{:.2} m", self.reference_width_mm / 1000.0),
            bbox_width: format!("{:.0} px", self.pixel_width()),
            focal_constant: format!("{:.1}", self.focal_constant),
            estimate_mode: self.estimate_mode,
            formula: formula_lines(
                self.focal_constant,
                self.reference_width_mm,
                self.pixel_width(),
                self.distance_m,
                unit,
            ),
        }
    }
}

/// Display strings for the measurement panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementView {
    pub label: String,
    pub confidence: String,
    pub distance: String,
    pub unit_caption: String,
    pub reference_width: String,
    pub bbox_width: String,
    pub focal_constant: String,
    pub estimate_mode: EstimateMode,
    pub formula: [String; 3],
}

/// Reconstruct the pinhole formula with the values actually used:
///
/// ```text
/// D = (K × W_real) / W_pixel
/// D = (1400.0 × 0.40) / 100
/// D = 5.60 m
/// ```
pub fn formula_lines(
    focal_constant: f64,
    real_width_mm: f64,
    pixel_width: f64,
    distance_m: f64,
    unit: DistanceUnit,
) -> [String; 3] {
    [
        "D = (K × W_real) / W_pixel".to_string(),
        format!(
            "D = ({:.1} × {:.2}) / {:.0}",
            focal_constant,
            real_width_mm / 1000.0,
            pixel_width
        ),
        format!("D = {}", unit.format_spaced(distance_m)),
    ]
}
