//! Handlers for image uploads and tap-to-measure.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use semadepth_core::detection::{DetectionBatch, ImageSize};
use semadepth_core::hit_test::{CanvasRect, PointerPosition};
use semadepth_core::measurement::MeasurementView;
use semadepth_core::types::DetectionId;
use semadepth_session::{Session, TapOutcome, UploadOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::upload::read_image;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TapRequest {
    pub pointer: PointerPosition,
    /// On-screen placement of the canvas element.
    pub rect: CanvasRect,
    /// Canvas bitmap resolution.
    pub bitmap: ImageSize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub outcome: UploadOutcome,
    pub status: String,
    pub batch: Option<DetectionBatch>,
}

#[derive(Debug, Serialize)]
pub struct TapResponse {
    pub result: TapOutcome,
    pub status: String,
    pub active_detection: Option<DetectionId>,
    pub measurement: Option<MeasurementView>,
}

impl TapResponse {
    fn new(result: TapOutcome, session: &Session) -> Self {
        let measurement = match &result {
            TapOutcome::Measured { measurement } => Some(measurement.view(session.unit())),
            _ => None,
        };
        Self {
            result,
            status: session.status().to_string(),
            active_detection: session.active_detection(),
            measurement,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/images
///
/// The session lock is released while detection runs. A result that arrives
/// after a newer upload started is dropped and reported as `superseded`.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<UploadResponse>>> {
    let image = read_image(multipart).await?;

    let (ticket, detector) = {
        let mut session = state.session.lock().await;
        let ticket = session.begin_upload(&image)?;
        (ticket, session.detector())
    };

    let result = detector.detect(&image).await;

    let mut session = state.session.lock().await;
    let outcome = session.complete_upload(ticket, result)?;

    Ok(Json(DataResponse {
        data: UploadResponse {
            outcome,
            status: session.status().to_string(),
            batch: session.batch().cloned(),
        },
    }))
}

/// POST /api/v1/taps
pub async fn tap(
    State(state): State<AppState>,
    Json(body): Json<TapRequest>,
) -> AppResult<Json<DataResponse<TapResponse>>> {
    let mut session = state.session.lock().await;
    let result = session.tap(body.pointer, body.rect, body.bitmap).await?;

    Ok(Json(DataResponse {
        data: TapResponse::new(result, &session),
    }))
}

/// POST /api/v1/detections/{id}/measure
pub async fn measure_detection(
    State(state): State<AppState>,
    Path(id): Path<DetectionId>,
) -> AppResult<Json<DataResponse<TapResponse>>> {
    let mut session = state.session.lock().await;
    let result = session.select(id).await?;

    Ok(Json(DataResponse {
        data: TapResponse::new(result, &session),
    }))
}
