pub mod calibration;
pub mod health;
pub mod measurement;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /session                                  snapshot (GET)
/// /log                                      entries + stats (GET)
/// /settings/unit                            display unit (PUT)
/// /settings/accurate-mode                   anchor-only gate (PUT)
///
/// /calibration/guided                       reference photo (POST, multipart)
/// /calibration/manual                       focal constant (PUT)
///
/// /images                                   upload + detect (POST, multipart)
/// /taps                                     tap to measure (POST)
/// /detections/{id}/measure                  measure by id (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(session::router())
        .nest("/calibration", calibration::router())
        .merge(measurement::router())
}
