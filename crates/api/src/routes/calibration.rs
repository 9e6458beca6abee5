//! Mounted at `/calibration`.
//!
//! ```text
//! POST /guided                      calibrate_guided
//! PUT  /manual                      calibrate_manual
//! ```

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::calibration;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/guided", post(calibration::calibrate_guided))
        .route("/manual", put(calibration::calibrate_manual))
}
