//! Contracts of the four external collaborators.
//!
//! The session only ever talks to these traits, so the HTTP client in
//! [`crate::api`] and in-memory fakes are interchangeable.

use async_trait::async_trait;

use semadepth_core::detection::DetectionBatch;
use semadepth_core::dimensions::CanonicalDimensions;

use crate::error::ServiceError;
use crate::wire::{CalibrateResponse, MeasureRequest};

/// An image file submitted for detection or calibration.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reject non-image content types and empty files.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.content_type.starts_with("image/") {
            return Err(ServiceError::InvalidUpload("Upload must be an image.".to_string()));
        }
        if self.bytes.is_empty() {
            return Err(ServiceError::InvalidUpload("Empty image file.".to_string()));
        }
        Ok(())
    }

    /// Size in KiB, for logging.
    pub fn size_kib(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Object detection: image in, batch of labelled boxes out.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: &ImageUpload) -> Result<DetectionBatch, ServiceError>;
}

/// Canonical real-world dimensions for a label.
#[async_trait]
pub trait DimensionsSource: Send + Sync {
    async fn dimensions(&self, label: &str) -> Result<CanonicalDimensions, ServiceError>;
}

/// Evaluates the pinhole distance formula. Returns meters.
#[async_trait]
pub trait DistanceService: Send + Sync {
    async fn measure(&self, request: &MeasureRequest) -> Result<f64, ServiceError>;
}

/// Fits a focal constant from a reference photo.
#[async_trait]
pub trait Calibrator: Send + Sync {
    async fn calibrate(&self, image: &ImageUpload) -> Result<CalibrateResponse, ServiceError>;
}
