//! Handlers for guided and manual calibration.

use axum::extract::{Multipart, State};
use axum::Json;
use semadepth_core::calibration::CalibrationState;
use semadepth_core::measurement::MeasurementView;
use semadepth_session::Session;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::upload::read_image;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ManualCalibrationRequest {
    pub focal_constant: f64,
}

#[derive(Debug, Serialize)]
pub struct CalibrationResponse {
    pub calibration: CalibrationState,
    pub summary: String,
    pub status: String,
    /// The on-screen measurement, recomputed after a manual change.
    pub last_measurement: Option<MeasurementView>,
}

impl CalibrationResponse {
    fn from_session(session: &Session) -> Self {
        Self {
            calibration: session.calibration().clone(),
            summary: session.calibration().summary(),
            status: session.status().to_string(),
            last_measurement: session
                .last_measurement()
                .map(|m| m.view(session.unit())),
        }
    }
}

/// POST /api/v1/calibration/guided
///
/// Multipart body with the reference photo in the `image` field.
pub async fn calibrate_guided(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<CalibrationResponse>>> {
    let image = read_image(multipart).await?;

    let mut session = state.session.lock().await;
    session.calibrate_guided(&image).await?;

    Ok(Json(DataResponse {
        data: CalibrationResponse::from_session(&session),
    }))
}

/// PUT /api/v1/calibration/manual
pub async fn calibrate_manual(
    State(state): State<AppState>,
    Json(body): Json<ManualCalibrationRequest>,
) -> AppResult<Json<DataResponse<CalibrationResponse>>> {
    let mut session = state.session.lock().await;
    session.calibrate_manual(body.focal_constant).await?;

    Ok(Json(DataResponse {
        data: CalibrationResponse::from_session(&session),
    }))
}
