#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use semadepth_api::config::{InferenceConfig, ServerConfig};
use semadepth_api::router::build_app_router;
use semadepth_api::state::AppState;
use semadepth_core::detection::{BoundingBox, Detection, DetectionBatch, ImageSize};
use semadepth_core::dimensions::CanonicalDimensions;
use semadepth_inference::wire::{CalibrateResponse, MeasureRequest};
use semadepth_inference::{
    Calibrator, Detector, DimensionsSource, DistanceService, ImageUpload, ServiceError,
};
use semadepth_session::{Collaborators, Session, SessionSettings};
use tokio::sync::Notify;
use tower::ServiceExt;

pub const BOUNDARY: &str = "semadepth-test-boundary";

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

pub struct SceneDetector {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Detector for SceneDetector {
    async fn detect(&self, _image: &ImageUpload) -> Result<DetectionBatch, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(scene())
    }
}

/// Holds its first call until `gate` is notified; later calls return a
/// one-detection batch straight away.
#[derive(Default)]
pub struct GatedDetector {
    pub calls: AtomicUsize,
    pub gate: Notify,
}

#[async_trait]
impl Detector for GatedDetector {
    async fn detect(&self, _image: &ImageUpload) -> Result<DetectionBatch, ServiceError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.gate.notified().await;
            return Ok(scene());
        }
        let mut batch = scene();
        batch.detections.truncate(1);
        Ok(batch)
    }
}

pub struct CupDimensions;

#[async_trait]
impl DimensionsSource for CupDimensions {
    async fn dimensions(&self, label: &str) -> Result<CanonicalDimensions, ServiceError> {
        match label {
            "cup" => Ok(CanonicalDimensions::new(80.0, 95.0, 80.0)),
            other => Err(ServiceError::Api {
                status: 404,
                detail: format!("unknown label {other}"),
            }),
        }
    }
}

#[derive(Default)]
pub struct PinholeDistance {
    pub requests: Mutex<Vec<MeasureRequest>>,
}

#[async_trait]
impl DistanceService for PinholeDistance {
    async fn measure(&self, request: &MeasureRequest) -> Result<f64, ServiceError> {
        self.requests.lock().unwrap().push(*request);
        Ok(request.focal_constant * request.real_width_mm / request.pixel_width / 1000.0)
    }
}

/// Fits 1400 from any photo except one named `blank.jpg`.
pub struct FakeCalibrator;

#[async_trait]
impl Calibrator for FakeCalibrator {
    async fn calibrate(&self, image: &ImageUpload) -> Result<CalibrateResponse, ServiceError> {
        if image.file_name == "blank.jpg" {
            return Err(ServiceError::Api {
                status: 400,
                detail: "No object detected for calibration.".to_string(),
            });
        }
        Ok(CalibrateResponse {
            label: "mouse".to_string(),
            focal_constant: 1400.0,
            pixel_width: Some(400.0),
            real_width_mm: Some(120.0),
            width_source: Some("anchor".to_string()),
            distance_mm: Some(304.8),
        })
    }
}

pub fn scene() -> DetectionBatch {
    let det = |id: u32, label: &str, confidence: f64, x1: f64, y1: f64, anchor: Option<f64>| {
        let bbox = BoundingBox::from_corners(x1, y1, x1 + 100.0, y1 + 80.0).unwrap();
        Detection::new(id, label, confidence, bbox, anchor).unwrap()
    };
    DetectionBatch {
        image: ImageSize {
            width: 1000,
            height: 1000,
        },
        detections: vec![
            det(0, "laptop", 0.9, 100.0, 100.0, Some(400.0)),
            det(1, "cup", 0.8, 500.0, 500.0, None),
            det(2, "bottle", 0.42, 800.0, 100.0, None),
        ],
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(accurate_mode: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        inference: InferenceConfig {
            url: "http://inference.test".to_string(),
            timeout_secs: 5,
            local_calibration: false,
        },
        accurate_mode,
    }
}

pub struct TestApp {
    pub router: Router,
    pub detector: Arc<SceneDetector>,
    pub distance: Arc<PinholeDistance>,
}

/// Build the full application router over fake collaborators.
pub fn build_test_app(accurate_mode: bool) -> TestApp {
    let detector = Arc::new(SceneDetector {
        calls: AtomicUsize::new(0),
    });
    let distance = Arc::new(PinholeDistance::default());
    let router = build_router(detector.clone(), distance.clone(), accurate_mode);

    TestApp {
        router,
        detector,
        distance,
    }
}

/// Build the router around a [`GatedDetector`].
pub fn build_gated_app() -> (Router, Arc<GatedDetector>) {
    let detector = Arc::new(GatedDetector::default());
    let distance = Arc::new(PinholeDistance::default());
    let router = build_router(detector.clone(), distance, true);
    (router, detector)
}

fn build_router(
    detector: Arc<dyn Detector>,
    distance: Arc<PinholeDistance>,
    accurate_mode: bool,
) -> Router {
    let config = test_config(accurate_mode);
    let session = Session::new(
        Collaborators {
            detector,
            dimensions: Arc::new(CupDimensions),
            distance,
            calibrator: Arc::new(FakeCalibrator),
        },
        SessionSettings {
            accurate_mode,
            ..SessionSettings::default()
        },
    );
    let state = AppState::new(session, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn post_empty(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a single file under the multipart field `field`.
pub async fn post_file(
    app: &Router,
    uri: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_photo(app: &Router, uri: &str, file_name: &str) -> Response<Body> {
    post_file(app, uri, "image", file_name, "image/jpeg", &[0xff, 0xd8, 0xff, 0xe0]).await
}

/// Calibrate manually at K = 1400 and upload the scene.
pub async fn ready(app: &Router) {
    let response = put_json(
        app,
        "/api/v1/calibration/manual",
        serde_json::json!({ "focal_constant": 1400.0 }),
    )
    .await;
    assert_eq!(response.status(), 200);
    let response = post_photo(app, "/api/v1/images", "scene.jpg").await;
    assert_eq!(response.status(), 200);
}

/// Tap body for an identity mapping: 1000×1000 canvas shown at 1000×1000.
pub fn tap_at(x: f64, y: f64) -> serde_json::Value {
    serde_json::json!({
        "pointer": { "client_x": x, "client_y": y },
        "rect": { "left": 0.0, "top": 0.0, "width": 1000.0, "height": 1000.0 },
        "bitmap": { "width": 1000, "height": 1000 },
    })
}
