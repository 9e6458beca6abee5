//! Most-recent-first log of completed measurements and its running
//! statistics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::reference_width::EstimateMode;
use crate::types::Timestamp;
use crate::units::DistanceUnit;

/// Placeholder shown for a statistic with no samples.
pub const EMPTY_STAT: &str = "--";

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One logged measurement. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLogEntry {
    pub label: String,
    pub confidence: f64,
    pub real_width_mm: f64,
    pub distance_m: f64,
    /// Focal constant in effect when the entry was logged.
    pub focal_constant: f64,
    pub estimate_mode: EstimateMode,
    pub timestamp: Timestamp,
}

impl SessionLogEntry {
    /// Metadata line, e.g. `W:0.32m · CONF:91.2% · K:1400 · EXP`.
    pub fn summary_line(&self) -> String {
        let mode = if self.estimate_mode.is_experimental() {
            " · EXP"
        } else {
            ""
        };
        format!(
            "W:{:.2}m · CONF:{:.1}% · K:{}{}",
            self.real_width_mm / 1000.0,
            self.confidence * 100.0,
            self.focal_constant.round(),
            mode
        )
    }

    /// Wall-clock time of the entry, `HH:MM:SS`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    pub fn distance_label(&self, unit: DistanceUnit) -> String {
        unit.format(self.distance_m)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate over the whole log. Means are `None` for an empty log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub count: usize,
    pub mean_distance_m: Option<f64>,
    pub mean_confidence: Option<f64>,
}

impl SessionStats {
    pub fn mean_distance_label(&self, unit: DistanceUnit) -> String {
        self.mean_distance_m
            .map(|d| unit.format(d))
            .unwrap_or_else(|| EMPTY_STAT.to_string())
    }

    pub fn mean_confidence_label(&self) -> String {
        self.mean_confidence
            .map(|c| format!("{:.0}%", c * 100.0))
            .unwrap_or_else(|| EMPTY_STAT.to_string())
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: VecDeque<SessionLogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the head.
    pub fn append(&mut self, entry: SessionLogEntry) {
        self.entries.push_front(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &SessionLogEntry> {
        self.entries.iter()
    }

    pub fn stats(&self) -> SessionStats {
        let count = self.entries.len();
        if count == 0 {
            return SessionStats {
                count,
                mean_distance_m: None,
                mean_confidence: None,
            };
        }
        let n = count as f64;
        let total_distance: f64 = self.entries.iter().map(|e| e.distance_m).sum();
        let total_confidence: f64 = self.entries.iter().map(|e| e.confidence).sum();
        SessionStats {
            count,
            mean_distance_m: Some(total_distance / n),
            mean_confidence: Some(total_confidence / n),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
