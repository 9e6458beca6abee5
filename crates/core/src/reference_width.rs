//! Reference-width policy: which real-world width feeds the distance formula.
//!
//! Anchor objects use their provider-supplied width verbatim. Everything
//! else is an experimental estimate built from the label's canonical
//! dimensions, taking the smallest plausible dimension so distances are not
//! systematically overestimated.

use serde::{Deserialize, Serialize};

use crate::detection::BoundingBox;
use crate::dimensions::CanonicalDimensions;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower clamp bound for a canonical dimension (mm).
pub const MIN_DIMENSION_MM: f64 = 40.0;
/// Upper clamp bound for a canonical dimension (mm).
pub const MAX_DIMENSION_MM: f64 = 3000.0;
/// Substitute for a missing, zero or non-numeric dimension (mm).
pub const DEFAULT_DIMENSION_MM: f64 = 400.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the reference width of a measurement was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMode {
    Anchor,
    Experimental,
}

impl EstimateMode {
    pub fn is_experimental(self) -> bool {
        self == Self::Experimental
    }
}

/// Input to the resolver once any dimensions lookup has completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceWidth {
    Anchor(f64),
    Heuristic(CanonicalDimensions),
}

/// Output of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWidth {
    pub width_mm: f64,
    pub mode: EstimateMode,
}

impl ReferenceWidth {
    /// Resolve to a millimeter width for a detection with the given box.
    pub fn resolve(&self, bbox: &BoundingBox) -> ResolvedWidth {
        match self {
            Self::Anchor(width_mm) => ResolvedWidth {
                width_mm: *width_mm,
                mode: EstimateMode::Anchor,
            },
            Self::Heuristic(dims) => ResolvedWidth {
                width_mm: select_reference_width_mm(bbox, dims),
                mode: EstimateMode::Experimental,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Heuristic selection
// ---------------------------------------------------------------------------

/// Default a raw dimension, then clamp it into the plausible range.
pub fn normalize_dimension(raw_mm: Option<f64>) -> f64 {
    let value = match raw_mm {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => DEFAULT_DIMENSION_MM,
    };
    value.clamp(MIN_DIMENSION_MM, MAX_DIMENSION_MM)
}

/// Pick the conservative reference width for a non-anchor detection.
///
/// Both orientation branches currently yield the same minimum. They are kept
/// apart as the hook for orientation-specific rules; do not fold them.
pub fn select_reference_width_mm(bbox: &BoundingBox, dims: &CanonicalDimensions) -> f64 {
    let width = normalize_dimension(dims.width_mm);
    let height = normalize_dimension(dims.height_mm);
    let depth = normalize_dimension(dims.depth_mm);

    if bbox.is_portrait_like() {
        // Placeholder: portrait boxes may later favour height.
        height.min(width).min(depth)
    } else {
        width.min(depth).min(height)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
