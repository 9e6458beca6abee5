//! Reference-object selection and focal-constant fitting for guided
//! calibration.
//!
//! The user photographs an object held about one foot (304.8 mm) from the
//! camera. The best candidate is the confident, centered, medium-sized box;
//! huge scene-level boxes are penalized. The focal constant then follows from
//! `K = P × D / W`.

use serde::{Deserialize, Serialize};

use crate::detection::{Detection, DetectionBatch, ImageSize};
use crate::dimensions::CanonicalDimensions;
use crate::error::CoreError;
use crate::reference_width::{EstimateMode, DEFAULT_DIMENSION_MM};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Distance between camera and reference object during calibration (mm).
pub const CALIBRATION_DISTANCE_MM: f64 = 304.8;
/// Candidates below this confidence are ignored.
pub const CALIBRATION_CONFIDENCE_THRESHOLD: f64 = 0.55;
pub const MIN_CALIBRATION_WIDTH_MM: f64 = 30.0;
pub const MAX_CALIBRATION_WIDTH_MM: f64 = 5000.0;
pub const MIN_FITTED_FOCAL: f64 = 50.0;
pub const MAX_FITTED_FOCAL: f64 = 10000.0;

/// Preferred share of the image covered by the reference box.
const TARGET_AREA_RATIO: f64 = 0.12;
const ANCHOR_BONUS: f64 = 0.12;
const HUGE_BOX_RATIO: f64 = 0.45;
const HUGE_BOX_PENALTY: f64 = 0.5;
const LARGE_SCENE_RATIO: f64 = 0.20;
const LARGE_SCENE_PENALTY: f64 = 0.3;

/// Classes that usually fill the frame as part of the scene rather than
/// being held up to the camera.
pub const LARGE_SCENE_OBJECTS: &[&str] = &[
    "bed",
    "couch",
    "sofa",
    "dining table",
    "table",
    "desk",
    "chair",
    "tv",
    "refrigerator",
];

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Score one candidate against the image it was detected in.
pub fn score_candidate(detection: &Detection, image: ImageSize) -> f64 {
    let image_w = image.width.max(1) as f64;
    let image_h = image.height.max(1) as f64;
    let bbox = &detection.bbox;

    let width = bbox.width.max(1.0);
    let height = bbox.height.max(1.0);
    let (center_x, center_y) = bbox.center();

    let dx = (center_x - image.width as f64 / 2.0) / image_w;
    let dy = (center_y - image.height as f64 / 2.0) / image_h;
    let center_distance = (dx * dx + dy * dy).sqrt();

    let area_ratio = width * height / (image_w * image_h);
    let area_score = (1.0 - (area_ratio - TARGET_AREA_RATIO).abs() / TARGET_AREA_RATIO).max(0.0);

    let anchor_bonus = if detection.is_anchor() { ANCHOR_BONUS } else { 0.0 };

    let mut penalty = 0.0;
    if area_ratio > HUGE_BOX_RATIO {
        penalty += HUGE_BOX_PENALTY;
    }
    let label = detection.label.to_lowercase();
    if LARGE_SCENE_OBJECTS.contains(&label.as_str()) && area_ratio > LARGE_SCENE_RATIO {
        penalty += LARGE_SCENE_PENALTY;
    }

    0.50 * (1.0 - center_distance) + 0.35 * area_score + 0.15 * detection.confidence + anchor_bonus
        - penalty
}

/// Pick the reference object. Ties keep the earliest detection.
pub fn select_target(batch: &DetectionBatch) -> Result<&Detection, CoreError> {
    if batch.detections.is_empty() {
        return Err(CoreError::Calibration(
            "No object detected for calibration.".to_string(),
        ));
    }

    let mut best: Option<(&Detection, f64)> = None;
    for detection in &batch.detections {
        if detection.confidence < CALIBRATION_CONFIDENCE_THRESHOLD {
            continue;
        }
        let score = score_candidate(detection, batch.image);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((detection, score));
        }
    }

    best.map(|(d, _)| d).ok_or_else(|| {
        CoreError::Calibration(format!(
            "Unable to select a reliable calibration object (confidence must be >= {CALIBRATION_CONFIDENCE_THRESHOLD:.2})."
        ))
    })
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

/// `K = P × D / W`. Zero pixel width yields zero.
pub fn fit_focal_constant(pixel_width: f64, real_width_mm: f64, distance_mm: f64) -> f64 {
    if pixel_width == 0.0 || real_width_mm == 0.0 {
        return 0.0;
    }
    pixel_width * distance_mm / real_width_mm
}

/// Outcome of a guided calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalFit {
    pub label: String,
    pub focal_constant: f64,
    pub pixel_width: f64,
    pub real_width_mm: f64,
    pub width_source: EstimateMode,
    pub distance_mm: f64,
}

/// Fit the focal constant from the chosen target.
///
/// `dims` is only consulted for non-anchor targets; its raw width (not the
/// conservative minimum) is used, clamped to the calibration range.
pub fn fit_target(
    target: &Detection,
    dims: Option<&CanonicalDimensions>,
) -> Result<FocalFit, CoreError> {
    let pixel_width = target.bbox.width.max(1.0);

    let (raw_width_mm, width_source) = match target.width_source.anchor_width_mm() {
        Some(width_mm) => (width_mm, EstimateMode::Anchor),
        None => (
            dims.and_then(|d| d.width_mm)
                .filter(|w| *w > 0.0)
                .unwrap_or(DEFAULT_DIMENSION_MM),
            EstimateMode::Experimental,
        ),
    };
    let real_width_mm = raw_width_mm.clamp(MIN_CALIBRATION_WIDTH_MM, MAX_CALIBRATION_WIDTH_MM);

    let focal_constant = fit_focal_constant(pixel_width, real_width_mm, CALIBRATION_DISTANCE_MM);
    if !(MIN_FITTED_FOCAL..=MAX_FITTED_FOCAL).contains(&focal_constant) {
        return Err(CoreError::Calibration(
            "Calibration failed. Focal constant out of valid range; retry with a clearer, centered object."
                .to_string(),
        ));
    }

    Ok(FocalFit {
        label: target.label.clone(),
        focal_constant,
        pixel_width,
        real_width_mm,
        width_source,
        distance_mm: CALIBRATION_DISTANCE_MM,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
