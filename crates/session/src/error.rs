//! Failure taxonomy of session operations.
//!
//! Every variant leaves calibration, log and detections as they were before
//! the failing operation started.

use semadepth_core::error::CoreError;
use semadepth_core::types::DetectionId;
use semadepth_inference::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Measurement or upload attempted before calibration.
    #[error("Calibration required before measuring")]
    NotCalibrated,

    /// The dimensions collaborator failed for a non-anchor label.
    #[error("Dimensions unavailable for '{label}': {source}")]
    DimensionsUnavailable {
        label: String,
        #[source]
        source: ServiceError,
    },

    #[error("Measurement service failed: {0}")]
    MeasurementService(#[source] ServiceError),

    #[error("Detection service failed: {0}")]
    DetectionService(#[source] ServiceError),

    #[error("Calibration service failed: {0}")]
    CalibrationService(#[source] ServiceError),

    /// A calibration value was refused by the state machine.
    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No detection with id {0} in the current batch")]
    UnknownDetection(DetectionId),
}

impl From<CoreError> for SessionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotCalibrated => Self::NotCalibrated,
            CoreError::Calibration(msg) => Self::InvalidCalibration(msg),
            CoreError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl SessionError {
    /// Reason to show the user. Collaborator `detail` messages are passed
    /// through verbatim.
    pub fn reason(&self) -> String {
        match self {
            Self::CalibrationService(source)
            | Self::DetectionService(source)
            | Self::MeasurementService(source) => source
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| source.to_string()),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_onto_taxonomy() {
        assert!(matches!(
            SessionError::from(CoreError::NotCalibrated),
            SessionError::NotCalibrated
        ));
        assert!(matches!(
            SessionError::from(CoreError::Calibration("x".into())),
            SessionError::InvalidCalibration(_)
        ));
    }

    #[test]
    fn calibration_reason_is_service_detail() {
        let err = SessionError::CalibrationService(ServiceError::Api {
            status: 400,
            detail: "No object detected for calibration.".to_string(),
        });
        assert_eq!(err.reason(), "No object detected for calibration.");
    }
}
