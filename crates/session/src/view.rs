//! Serializable read models of the session, rendered in the current unit.

use semadepth_core::calibration::CalibrationState;
use semadepth_core::detection::DetectionBatch;
use semadepth_core::measurement::MeasurementView;
use semadepth_core::reference_width::EstimateMode;
use semadepth_core::session_log::SessionStats;
use semadepth_core::types::{DetectionId, Timestamp};
use semadepth_core::units::DistanceUnit;
use serde::Serialize;

use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub mean_distance: String,
    pub mean_confidence: String,
    #[serde(flatten)]
    pub raw: SessionStats,
}

impl StatsView {
    pub fn new(stats: SessionStats, unit: DistanceUnit) -> Self {
        Self {
            mean_distance: stats.mean_distance_label(unit),
            mean_confidence: stats.mean_confidence_label(),
            raw: stats,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntryView {
    pub label: String,
    pub distance: String,
    pub summary: String,
    pub time: String,
    pub distance_m: f64,
    pub confidence: f64,
    pub real_width_mm: f64,
    pub focal_constant: f64,
    pub estimate_mode: EstimateMode,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    pub unit: DistanceUnit,
    pub entries: Vec<LogEntryView>,
    pub stats: StatsView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub calibration: CalibrationState,
    pub calibration_summary: String,
    pub unit: DistanceUnit,
    pub accurate_mode: bool,
    pub status: String,
    pub batch: Option<DetectionBatch>,
    pub active_detection: Option<DetectionId>,
    pub last_measurement: Option<MeasurementView>,
    pub stats: StatsView,
}

impl Session {
    pub fn log_view(&self) -> LogView {
        let unit = self.unit();
        let entries = self
            .log()
            .entries()
            .map(|entry| LogEntryView {
                label: entry.label.to_uppercase(),
                distance: entry.distance_label(unit),
                summary: entry.summary_line(),
                time: entry.time_label(),
                distance_m: entry.distance_m,
                confidence: entry.confidence,
                real_width_mm: entry.real_width_mm,
                focal_constant: entry.focal_constant,
                estimate_mode: entry.estimate_mode,
                timestamp: entry.timestamp,
            })
            .collect();
        LogView {
            unit,
            entries,
            stats: StatsView::new(self.stats(), unit),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let unit = self.unit();
        SessionSnapshot {
            calibration: self.calibration().clone(),
            calibration_summary: self.calibration().summary(),
            unit,
            accurate_mode: self.accurate_mode(),
            status: self.status().to_string(),
            batch: self.batch().cloned(),
            active_detection: self.active_detection(),
            last_measurement: self.last_measurement().map(|m| m.view(unit)),
            stats: StatsView::new(self.stats(), unit),
        }
    }
}
