//! Integration tests for [`LocalCalibrator`] against in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use semadepth_core::detection::{BoundingBox, Detection, DetectionBatch, ImageSize};
use semadepth_core::dimensions::CanonicalDimensions;
use semadepth_inference::local_calibrator::LocalCalibrator;
use semadepth_inference::{Calibrator, Detector, DimensionsSource, ImageUpload, ServiceError};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FixedDetector(DetectionBatch);

#[async_trait]
impl Detector for FixedDetector {
    async fn detect(&self, _image: &ImageUpload) -> Result<DetectionBatch, ServiceError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct CountingDimensions {
    calls: AtomicUsize,
}

#[async_trait]
impl DimensionsSource for CountingDimensions {
    async fn dimensions(&self, _label: &str) -> Result<CanonicalDimensions, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CanonicalDimensions::new(150.0, 100.0, 80.0))
    }
}

fn batch(detections: Vec<Detection>) -> DetectionBatch {
    DetectionBatch {
        image: ImageSize {
            width: 1000,
            height: 1000,
        },
        detections,
    }
}

fn det(
    label: &str,
    confidence: f64,
    corners: (f64, f64, f64, f64),
    anchor: Option<f64>,
) -> Detection {
    let bbox = BoundingBox::from_corners(corners.0, corners.1, corners.2, corners.3).unwrap();
    Detection::new(0, label, confidence, bbox, anchor).unwrap()
}

fn photo() -> ImageUpload {
    ImageUpload::new("ref.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn anchor_target_skips_dimensions_lookup() {
    let detector = Arc::new(FixedDetector(batch(vec![det(
        "mouse",
        0.9,
        (400.0, 450.0, 800.0, 550.0),
        Some(120.0),
    )])));
    let dims = Arc::new(CountingDimensions::default());
    let calibrator = LocalCalibrator::new(detector, dims.clone());

    let fit = calibrator.calibrate(&photo()).await.unwrap();

    assert_eq!(fit.label, "mouse");
    assert!((fit.focal_constant - 400.0 * 304.8 / 120.0).abs() < 1e-9);
    assert_eq!(fit.width_source.as_deref(), Some("anchor"));
    assert_eq!(dims.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn heuristic_target_uses_canonical_width() {
    let detector = Arc::new(FixedDetector(batch(vec![det(
        "stapler",
        0.8,
        (400.0, 450.0, 700.0, 550.0),
        None,
    )])));
    let dims = Arc::new(CountingDimensions::default());
    let calibrator = LocalCalibrator::new(detector, dims.clone());

    let fit = calibrator.calibrate(&photo()).await.unwrap();

    assert_eq!(fit.real_width_mm, Some(150.0));
    assert_eq!(fit.width_source.as_deref(), Some("canonical"));
    assert_eq!(dims.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_detection_surfaces_detail_verbatim() {
    let calibrator = LocalCalibrator::new(
        Arc::new(FixedDetector(batch(vec![]))),
        Arc::new(CountingDimensions::default()),
    );

    let err = calibrator.calibrate(&photo()).await.unwrap_err();

    assert_matches!(&err, ServiceError::Rejected(_));
    assert_eq!(err.detail(), Some("No object detected for calibration."));
}
