//! Display formatting for distances. Stored values are always meters.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Feet per meter.
pub const FEET_PER_METER: f64 = 3.28084;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "ft")]
    Feet,
}

impl DistanceUnit {
    /// Short suffix: `m` or `ft`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Feet => "ft",
        }
    }

    /// Caption shown next to the headline number.
    pub fn caption(self) -> &'static str {
        match self {
            Self::Meters => "METERS",
            Self::Feet => "FEET",
        }
    }

    /// Convert a meter value into this unit.
    pub fn convert(self, distance_m: f64) -> f64 {
        match self {
            Self::Meters => distance_m,
            Self::Feet => distance_m * FEET_PER_METER,
        }
    }

    /// Bare number with two decimals, e.g. `6.56`.
    pub fn format_value(self, distance_m: f64) -> String {
        format!("{:.2}", self.convert(distance_m))
    }

    /// Compact form, e.g. `2.00m` or `6.56ft`.
    pub fn format(self, distance_m: f64) -> String {
        format!("{}{}", self.format_value(distance_m), self.suffix())
    }

    /// Spaced form used in the formula box, e.g. `2.00 m`.
    pub fn format_spaced(self, distance_m: f64) -> String {
        format!("{} {}", self.format_value(distance_m), self.suffix())
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meters" => Ok(Self::Meters),
            "ft" | "feet" => Ok(Self::Feet),
            other => Err(CoreError::Validation(format!("unknown distance unit '{other}'"))),
        }
    }
}
