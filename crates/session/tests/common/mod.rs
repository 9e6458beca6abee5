//! Recording fakes of the inference collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use semadepth_core::detection::{BoundingBox, Detection, DetectionBatch, ImageSize};
use semadepth_core::dimensions::CanonicalDimensions;
use semadepth_inference::wire::{CalibrateResponse, MeasureRequest};
use semadepth_inference::{
    Calibrator, Detector, DimensionsSource, DistanceService, ImageUpload, ServiceError,
};
use semadepth_session::{Collaborators, Session, SessionSettings};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDetector {
    pub batch: Mutex<Option<DetectionBatch>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Detector for FakeDetector {
    async fn detect(&self, _image: &ImageUpload) -> Result<DetectionBatch, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ServiceError::Api {
                status: 500,
                detail: "detector offline".to_string(),
            })
    }
}

#[derive(Default)]
pub struct FakeDimensions {
    pub records: Mutex<HashMap<String, CanonicalDimensions>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDimensions {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DimensionsSource for FakeDimensions {
    async fn dimensions(&self, label: &str) -> Result<CanonicalDimensions, ServiceError> {
        self.calls.lock().unwrap().push(label.to_string());
        self.records
            .lock()
            .unwrap()
            .get(label)
            .copied()
            .ok_or_else(|| ServiceError::Api {
                status: 502,
                detail: format!("no dimensions for {label}"),
            })
    }
}

/// Evaluates `K × W / px` locally and records every request.
#[derive(Default)]
pub struct FakeDistance {
    pub requests: Mutex<Vec<MeasureRequest>>,
    pub failing: AtomicBool,
}

impl FakeDistance {
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl DistanceService for FakeDistance {
    async fn measure(&self, request: &MeasureRequest) -> Result<f64, ServiceError> {
        self.requests.lock().unwrap().push(*request);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Timeout);
        }
        Ok(request.focal_constant * request.real_width_mm / request.pixel_width / 1000.0)
    }
}

pub struct FakeCalibrator {
    /// `None` makes every call fail with the service's no-object detail.
    pub focal_constant: Mutex<Option<f64>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Calibrator for FakeCalibrator {
    async fn calibrate(&self, _image: &ImageUpload) -> Result<CalibrateResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fitted = *self.focal_constant.lock().unwrap();
        match fitted {
            Some(focal_constant) => Ok(CalibrateResponse {
                label: "mouse".to_string(),
                focal_constant,
                pixel_width: Some(400.0),
                real_width_mm: Some(120.0),
                width_source: Some("anchor".to_string()),
                distance_mm: Some(304.8),
            }),
            None => Err(ServiceError::Api {
                status: 400,
                detail: "No object detected for calibration.".to_string(),
            }),
        }
    }
}

/// Never answers.
pub struct StalledCalibrator;

#[async_trait]
impl Calibrator for StalledCalibrator {
    async fn calibrate(&self, _image: &ImageUpload) -> Result<CalibrateResponse, ServiceError> {
        std::future::pending().await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub session: Session,
    pub detector: Arc<FakeDetector>,
    pub dimensions: Arc<FakeDimensions>,
    pub distance: Arc<FakeDistance>,
    pub calibrator: Arc<FakeCalibrator>,
}

pub fn harness(accurate_mode: bool) -> Harness {
    let detector = Arc::new(FakeDetector::default());
    let dimensions = Arc::new(FakeDimensions::default());
    dimensions.records.lock().unwrap().insert(
        "cup".to_string(),
        CanonicalDimensions::new(80.0, 95.0, 80.0),
    );
    let distance = Arc::new(FakeDistance::default());
    let calibrator = Arc::new(FakeCalibrator {
        focal_constant: Mutex::new(Some(1400.0)),
        calls: AtomicUsize::new(0),
    });

    let session = Session::new(
        Collaborators {
            detector: detector.clone(),
            dimensions: dimensions.clone(),
            distance: distance.clone(),
            calibrator: calibrator.clone(),
        },
        SessionSettings {
            accurate_mode,
            ..SessionSettings::default()
        },
    );

    Harness {
        session,
        detector,
        dimensions,
        distance,
        calibrator,
    }
}

pub fn detection(
    id: u32,
    label: &str,
    confidence: f64,
    corners: (f64, f64, f64, f64),
    anchor_width_mm: Option<f64>,
) -> Detection {
    let bbox = BoundingBox::from_corners(corners.0, corners.1, corners.2, corners.3).unwrap();
    Detection::new(id, label, confidence, bbox, anchor_width_mm).unwrap()
}

/// 1000×1000 image with an anchor laptop, a heuristic cup and a blurry
/// bottle. Every box is 100 px wide.
pub fn scene() -> DetectionBatch {
    DetectionBatch {
        image: ImageSize {
            width: 1000,
            height: 1000,
        },
        detections: vec![
            detection(0, "laptop", 0.9, (100.0, 100.0, 200.0, 180.0), Some(400.0)),
            detection(1, "cup", 0.8, (500.0, 500.0, 600.0, 580.0), None),
            detection(2, "bottle", 0.42, (800.0, 100.0, 900.0, 180.0), None),
        ],
    }
}

pub fn photo() -> ImageUpload {
    ImageUpload::new("scene.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
}
