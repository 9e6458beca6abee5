//! Uploads and measurement.
//!
//! ```text
//! POST /images                      upload_image
//! POST /taps                        tap
//! POST /detections/{id}/measure     measure_detection
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::measurement;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/images", post(measurement::upload_image))
        .route("/taps", post(measurement::tap))
        .route("/detections/{id}/measure", post(measurement::measure_detection))
}
