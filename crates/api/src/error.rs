use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use semadepth_core::error::CoreError;
use semadepth_inference::ServiceError;
use semadepth_session::SessionError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Session(err) => classify_session_error(err),

            AppError::Core(core) => match core {
                CoreError::NotCalibrated => {
                    (StatusCode::CONFLICT, "NOT_CALIBRATED", core.to_string())
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Calibration(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CALIBRATION_FAILED",
                    msg.clone(),
                ),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a session error into an HTTP status, error code, and message.
///
/// - Collaborator timeouts map to 504.
/// - Collaborator failures map to 502, except guided calibration refusals
///   that carry a `detail`, which map to 422 with the detail verbatim.
fn classify_session_error(err: &SessionError) -> (StatusCode, &'static str, String) {
    match err {
        SessionError::NotCalibrated => (StatusCode::CONFLICT, "NOT_CALIBRATED", err.to_string()),
        SessionError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        SessionError::InvalidCalibration(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "CALIBRATION_FAILED",
            msg.clone(),
        ),
        SessionError::UnknownDetection(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        SessionError::CalibrationService(source) => match source {
            ServiceError::Timeout => timeout(err),
            ServiceError::Api { .. } | ServiceError::Rejected(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CALIBRATION_FAILED",
                err.reason(),
            ),
            ServiceError::InvalidUpload(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            _ => upstream(err, "CALIBRATION_FAILED"),
        },
        SessionError::DetectionService(source) => match source {
            ServiceError::Timeout => timeout(err),
            _ => upstream(err, "DETECTION_FAILED"),
        },
        SessionError::MeasurementService(source)
        | SessionError::DimensionsUnavailable { source, .. } => match source {
            ServiceError::Timeout => timeout(err),
            _ => upstream(err, "MEASUREMENT_FAILED"),
        },
    }
}

fn timeout(err: &SessionError) -> (StatusCode, &'static str, String) {
    tracing::warn!(error = %err, "Inference collaborator timed out");
    (
        StatusCode::GATEWAY_TIMEOUT,
        "UPSTREAM_TIMEOUT",
        err.to_string(),
    )
}

fn upstream(err: &SessionError, code: &'static str) -> (StatusCode, &'static str, String) {
    tracing::warn!(error = %err, "Inference collaborator failed");
    (StatusCode::BAD_GATEWAY, code, err.reason())
}
