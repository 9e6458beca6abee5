//! SemaDepth domain logic.
//!
//! Pure, I/O-free building blocks for monocular distance estimation:
//! detections, the calibration state machine, reference-width policy,
//! tap hit-testing, measurement records and the session log.

pub mod calibration;
pub mod detection;
pub mod dimensions;
pub mod error;
pub mod guided_fit;
pub mod measurement;
pub mod policy;
pub mod reference_width;
pub mod session_log;
pub mod types;
pub mod units;
