//! Detection batch types produced by the object-detection service.
//!
//! Bounding boxes are always expressed in original-image pixels, never in
//! canvas or display pixels. Whether a detection is an anchor object is
//! decided once, when the detection is ingested, and carried as an explicit
//! [`WidthSource`] variant.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DetectionId;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Pixel dimensions of an uploaded image or a canvas bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned box in original-image coordinates.
///
/// Invariant: `x2 = x1 + width` and `y2 = y1 + height`, with positive
/// width and height. Construct through [`BoundingBox::from_corners`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Build a box from its top-left and bottom-right corners.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, CoreError> {
        let width = x2 - x1;
        let height = y2 - y1;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(CoreError::Validation(format!(
                "bounding box must have positive size, got {width}x{height}"
            )));
        }
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            width,
            height,
        })
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Inclusive containment test on all four edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// A box is portrait-like when it is more than 20% taller than wide.
    pub fn is_portrait_like(&self) -> bool {
        self.height > self.width * PORTRAIT_ASPECT_RATIO
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Height-to-width ratio above which a box counts as portrait-like.
pub const PORTRAIT_ASPECT_RATIO: f64 = 1.2;

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Where the real-world width of a detection comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidthSource {
    /// Provider-supplied authoritative width in millimeters.
    Anchor { width_mm: f64 },
    /// Width must be estimated from canonical dimensions of the label.
    Heuristic,
}

impl WidthSource {
    /// Classify an optional provider anchor width. Absent, zero, negative and
    /// non-finite values all mean "no anchor".
    pub fn from_anchor_width(anchor_width_mm: Option<f64>) -> Self {
        match anchor_width_mm {
            Some(width_mm) if width_mm.is_finite() && width_mm > 0.0 => Self::Anchor { width_mm },
            _ => Self::Heuristic,
        }
    }

    pub fn anchor_width_mm(&self) -> Option<f64> {
        match self {
            Self::Anchor { width_mm } => Some(*width_mm),
            Self::Heuristic => None,
        }
    }
}

/// A single detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: DetectionId,
    pub label: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub width_source: WidthSource,
}

impl Detection {
    pub fn new(
        id: DetectionId,
        label: impl Into<String>,
        confidence: f64,
        bbox: BoundingBox,
        anchor_width_mm: Option<f64>,
    ) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::Validation(format!(
                "confidence must be between 0.0 and 1.0, got {confidence}"
            )));
        }
        Ok(Self {
            id,
            label: label.into(),
            confidence,
            bbox,
            width_source: WidthSource::from_anchor_width(anchor_width_mm),
        })
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self.width_source, WidthSource::Anchor { .. })
    }
}

/// Immutable result of one detection request. A new batch replaces the
/// previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    pub image: ImageSize,
    pub detections: Vec<Detection>,
}

impl DetectionBatch {
    pub fn find(&self, id: DetectionId) -> Option<&Detection> {
        self.detections.iter().find(|d| d.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
