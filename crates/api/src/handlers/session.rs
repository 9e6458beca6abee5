//! Handlers for the session snapshot, the log and display settings.

use axum::extract::State;
use axum::Json;
use semadepth_core::units::DistanceUnit;
use semadepth_session::view::{LogView, SessionSnapshot};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetUnitRequest {
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAccurateModeRequest {
    pub enabled: bool,
}

/// GET /api/v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<DataResponse<SessionSnapshot>> {
    let session = state.session.lock().await;
    Json(DataResponse {
        data: session.snapshot(),
    })
}

/// GET /api/v1/log
pub async fn get_log(State(state): State<AppState>) -> Json<DataResponse<LogView>> {
    let session = state.session.lock().await;
    Json(DataResponse {
        data: session.log_view(),
    })
}

/// PUT /api/v1/settings/unit
pub async fn set_unit(
    State(state): State<AppState>,
    Json(body): Json<SetUnitRequest>,
) -> AppResult<Json<DataResponse<SessionSnapshot>>> {
    let unit: DistanceUnit = body.unit.parse()?;

    let mut session = state.session.lock().await;
    session.set_unit(unit);
    tracing::debug!(?unit, "Display unit changed");

    Ok(Json(DataResponse {
        data: session.snapshot(),
    }))
}

/// PUT /api/v1/settings/accurate-mode
pub async fn set_accurate_mode(
    State(state): State<AppState>,
    Json(body): Json<SetAccurateModeRequest>,
) -> Json<DataResponse<SessionSnapshot>> {
    let mut session = state.session.lock().await;
    session.set_accurate_mode(body.enabled);
    tracing::debug!(enabled = body.enabled, "Accurate mode changed");

    Json(DataResponse {
        data: session.snapshot(),
    })
}
