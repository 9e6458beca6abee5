//! Canonical real-world dimensions of an object class.
//!
//! The dimensions service may return absent, null or non-numeric fields.
//! They are kept as `None` here; defaulting and clamping happen in
//! [`crate::reference_width`].

use serde::{Deserialize, Deserializer, Serialize};

/// Width/height/depth in millimeters for one object label.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalDimensions {
    #[serde(default, deserialize_with = "lenient_mm")]
    pub width_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_mm")]
    pub height_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_mm")]
    pub depth_mm: Option<f64>,
}

impl CanonicalDimensions {
    pub fn new(width_mm: f64, height_mm: f64, depth_mm: f64) -> Self {
        Self {
            width_mm: Some(width_mm),
            height_mm: Some(height_mm),
            depth_mm: Some(depth_mm),
        }
    }
}

/// Accept JSON numbers and numeric strings; anything else becomes `None`.
fn lenient_mm<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}
