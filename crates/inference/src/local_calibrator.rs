//! In-process guided calibration built on the detection and dimensions
//! collaborators.
//!
//! Used when the inference service exposes `/detect` and `/dimensions` but
//! not `/calibrate`, or when calibration should run next to the session.

use std::sync::Arc;

use async_trait::async_trait;
use semadepth_core::guided_fit;
use semadepth_core::reference_width::EstimateMode;

use crate::error::ServiceError;
use crate::service::{Calibrator, Detector, DimensionsSource, ImageUpload};
use crate::wire::CalibrateResponse;

pub struct LocalCalibrator {
    detector: Arc<dyn Detector>,
    dimensions: Arc<dyn DimensionsSource>,
}

impl LocalCalibrator {
    pub fn new(detector: Arc<dyn Detector>, dimensions: Arc<dyn DimensionsSource>) -> Self {
        Self {
            detector,
            dimensions,
        }
    }
}

#[async_trait]
impl Calibrator for LocalCalibrator {
    async fn calibrate(&self, image: &ImageUpload) -> Result<CalibrateResponse, ServiceError> {
        image.validate()?;
        let batch = self.detector.detect(image).await?;

        let target = guided_fit::select_target(&batch)
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;

        let dims = if target.is_anchor() {
            None
        } else {
            Some(self.dimensions.dimensions(&target.label).await?)
        };

        let fit = guided_fit::fit_target(target, dims.as_ref())
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;

        tracing::info!(
            label = %fit.label,
            focal_constant = fit.focal_constant,
            pixel_width = fit.pixel_width,
            real_width_mm = fit.real_width_mm,
            "Fitted focal constant from reference photo",
        );

        Ok(CalibrateResponse {
            label: fit.label,
            focal_constant: fit.focal_constant,
            pixel_width: Some(fit.pixel_width),
            real_width_mm: Some(fit.real_width_mm),
            width_source: Some(
                match fit.width_source {
                    EstimateMode::Anchor => "anchor",
                    EstimateMode::Experimental => "canonical",
                }
                .to_string(),
            ),
            distance_mm: Some(fit.distance_mm),
        })
    }
}
