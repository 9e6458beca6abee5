#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Calibration required before measuring")]
    NotCalibrated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Calibration(String),
}
