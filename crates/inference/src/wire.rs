//! Request and response payloads exchanged with the inference service.

use serde::{Deserialize, Serialize};

use semadepth_core::detection::{BoundingBox, Detection, DetectionBatch, ImageSize};
use semadepth_core::error::CoreError;
use semadepth_core::types::DetectionId;

// ---------------------------------------------------------------------------
// Detect
// ---------------------------------------------------------------------------

/// Response of `POST /detect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub image: ImageSize,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// A detection as the provider sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    pub id: DetectionId,
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub anchor_width_mm: Option<f64>,
    pub bbox: RawBox,
}

/// Provider bounding box. `width`/`height` are recomputed from the corners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl DetectResponse {
    /// Ingest into a domain batch, fixing each detection's width source.
    ///
    /// Detections with a degenerate box or an out-of-range confidence are
    /// dropped; the rest of the batch is kept.
    pub fn into_batch(self) -> DetectionBatch {
        let detections = self
            .detections
            .into_iter()
            .filter_map(|raw| {
                let id = raw.id;
                let label = raw.label.clone();
                match raw.into_detection() {
                    Ok(detection) => Some(detection),
                    Err(e) => {
                        tracing::warn!(
                            id,
                            label = %label,
                            error = %e,
                            "Dropping malformed detection"
                        );
                        None
                    }
                }
            })
            .collect();
        DetectionBatch {
            image: self.image,
            detections,
        }
    }
}

impl RawDetection {
    fn into_detection(self) -> Result<Detection, CoreError> {
        let RawBox { x1, y1, x2, y2 } = self.bbox;
        let bbox = BoundingBox::from_corners(x1, y1, x2, y2)?;
        Detection::new(
            self.id,
            self.label,
            self.confidence,
            bbox,
            self.anchor_width_mm,
        )
    }
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Body of `POST /dimensions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionsRequest {
    pub label: String,
}

// ---------------------------------------------------------------------------
// Measure
// ---------------------------------------------------------------------------

/// Body of `POST /measure`. Forwarded exactly as built by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureRequest {
    pub pixel_width: f64,
    pub real_width_mm: f64,
    pub focal_constant: f64,
}

/// Response of `POST /measure`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeasureResponse {
    pub distance_m: f64,
}

// ---------------------------------------------------------------------------
// Calibrate
// ---------------------------------------------------------------------------

/// Response of `POST /calibrate`. Only `label` and `focal_constant` are part
/// of the contract; the rest is diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateResponse {
    pub label: String,
    pub focal_constant: f64,
    #[serde(default)]
    pub pixel_width: Option<f64>,
    #[serde(default)]
    pub real_width_mm: Option<f64>,
    #[serde(default)]
    pub width_source: Option<String>,
    #[serde(default)]
    pub distance_mm: Option<f64>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error body of a non-2xx response.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Extract a readable detail from a raw body, falling back to the body.
    pub fn detail_from(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
            }) => detail,
            Ok(ErrorBody {
                detail: Some(other),
            }) => other.to_string(),
            _ => body.to_string(),
        }
    }
}
