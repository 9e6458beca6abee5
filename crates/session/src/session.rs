//! The measurement session: one calibration, one detection batch, one log.
//!
//! All state transitions go through [`Session`]. Collaborator failures leave
//! the state as it was before the call; only successful operations commit.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use semadepth_core::calibration::CalibrationState;
use semadepth_core::detection::{Detection, DetectionBatch, ImageSize, WidthSource};
use semadepth_core::hit_test::{self, CanvasRect, DrawScale, PointerPosition};
use semadepth_core::measurement::Measurement;
use semadepth_core::policy::{self, PolicyDecision};
use semadepth_core::reference_width::ReferenceWidth;
use semadepth_core::session_log::{SessionLog, SessionStats};
use semadepth_core::types::DetectionId;
use semadepth_core::units::DistanceUnit;
use semadepth_inference::wire::MeasureRequest;
use semadepth_inference::{
    Calibrator, Detector, DimensionsSource, DistanceService, ImageUpload, ServiceError,
};
use serde::Serialize;

use crate::cache::DimensionsCache;
use crate::error::SessionError;
use crate::status::Status;

// ---------------------------------------------------------------------------
// Collaborators and settings
// ---------------------------------------------------------------------------

/// External services the session depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub detector: Arc<dyn Detector>,
    pub dimensions: Arc<dyn DimensionsSource>,
    pub distance: Arc<dyn DistanceService>,
    pub calibrator: Arc<dyn Calibrator>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub accurate_mode: bool,
    pub unit: DistanceUnit,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            accurate_mode: true,
            unit: DistanceUnit::Meters,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a tap or a direct detection selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TapOutcome {
    /// The tap landed outside every detection.
    NoHit,
    LowConfidence { detection: Detection, confidence: f64 },
    /// Accurate mode refused a non-anchor detection.
    AnchorOnly { detection: Detection },
    Measured { measurement: Measurement },
}

/// Handle for an in-flight detection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    sequence: u64,
}

impl UploadTicket {
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Applied { detections: usize },
    /// A newer upload started while this one was in flight.
    Superseded,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    services: Collaborators,
    calibration: CalibrationState,
    dimensions: DimensionsCache,
    log: SessionLog,
    batch: Option<DetectionBatch>,
    active_detection: Option<DetectionId>,
    last_measurement: Option<Measurement>,
    unit: DistanceUnit,
    accurate_mode: bool,
    upload_sequence: u64,
    status: Status,
}

impl Session {
    pub fn new(services: Collaborators, settings: SessionSettings) -> Self {
        Self {
            services,
            calibration: CalibrationState::default(),
            dimensions: DimensionsCache::new(),
            log: SessionLog::new(),
            batch: None,
            active_detection: None,
            last_measurement: None,
            unit: settings.unit,
            accurate_mode: settings.accurate_mode,
            upload_sequence: 0,
            status: Status::Idle,
        }
    }

    // ---- accessors ----

    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn stats(&self) -> SessionStats {
        self.log.stats()
    }

    pub fn batch(&self) -> Option<&DetectionBatch> {
        self.batch.as_ref()
    }

    pub fn active_detection(&self) -> Option<DetectionId> {
        self.active_detection
    }

    pub fn last_measurement(&self) -> Option<&Measurement> {
        self.last_measurement.as_ref()
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn accurate_mode(&self) -> bool {
        self.accurate_mode
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn dimensions_cache(&self) -> &DimensionsCache {
        &self.dimensions
    }

    /// Detector handle, for running detection without holding the session.
    pub fn detector(&self) -> Arc<dyn Detector> {
        Arc::clone(&self.services.detector)
    }

    // ---- calibration ----

    /// Fit the focal constant from a reference photo held about one foot
    /// from the camera.
    pub async fn calibrate_guided(
        &mut self,
        image: &ImageUpload,
    ) -> Result<&CalibrationState, SessionError> {
        let started = Instant::now();

        let fit = match self.services.calibrator.calibrate(image).await {
            Ok(fit) => fit,
            Err(e) => {
                tracing::warn!(error = %e, file = %image.file_name, "Guided calibration failed");
                return Err(self.fail(SessionError::CalibrationService(e)));
            }
        };

        if let Err(e) = self.calibration.apply_guided(fit.focal_constant, &fit.label) {
            return Err(self.fail(e.into()));
        }

        tracing::info!(
            label = %fit.label,
            focal_constant = fit.focal_constant,
            pixel_width = ?fit.pixel_width,
            real_width_mm = ?fit.real_width_mm,
            width_source = ?fit.width_source,
            latency_ms = started.elapsed().as_millis() as u64,
            "Guided calibration applied",
        );
        self.status = Status::CalibratedUsing { label: fit.label };
        Ok(&self.calibration)
    }

    /// Set the focal constant directly. When a measurement is on screen it
    /// is recomputed with the new constant but not logged again.
    ///
    /// A failed recompute leaves the new calibration in place and the old
    /// measurement on screen.
    pub async fn calibrate_manual(
        &mut self,
        focal_constant: f64,
    ) -> Result<Option<&Measurement>, SessionError> {
        self.calibration.apply_manual(focal_constant)?;
        tracing::info!(focal_constant, "Manual calibration applied");

        if let Some(previous) = self.last_measurement.as_ref().map(|m| m.detection.clone()) {
            if let Err(e) = self.measure(&previous, false).await {
                tracing::warn!(
                    error = %e,
                    label = %previous.label,
                    "Recompute after manual calibration failed",
                );
            }
        }
        Ok(self.last_measurement.as_ref())
    }

    // ---- uploads ----

    /// Start an upload. Fails before any network call when uncalibrated or
    /// when the file is not an image.
    pub fn begin_upload(&mut self, image: &ImageUpload) -> Result<UploadTicket, SessionError> {
        if self.calibration.require_calibrated().is_err() {
            self.status = Status::CompleteCalibrationFirst;
            return Err(SessionError::NotCalibrated);
        }
        if let Err(e) = image.validate() {
            let reason = match e {
                ServiceError::InvalidUpload(msg) => msg,
                other => other.to_string(),
            };
            return Err(SessionError::Validation(reason));
        }

        self.upload_sequence += 1;
        tracing::debug!(
            sequence = self.upload_sequence,
            file = %image.file_name,
            size_kib = image.size_kib(),
            "Upload started",
        );
        Ok(UploadTicket {
            sequence: self.upload_sequence,
        })
    }

    /// Apply the detection result for `ticket`. Results of superseded
    /// uploads are dropped without touching the session.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<DetectionBatch, ServiceError>,
    ) -> Result<UploadOutcome, SessionError> {
        if ticket.sequence != self.upload_sequence {
            tracing::debug!(
                sequence = ticket.sequence,
                latest = self.upload_sequence,
                "Dropping stale detection result",
            );
            return Ok(UploadOutcome::Superseded);
        }

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "Detection failed");
                return Err(self.fail(SessionError::DetectionService(e)));
            }
        };

        let detections = batch.detections.len();
        tracing::info!(
            detections,
            image_width = batch.image.width,
            image_height = batch.image.height,
            "Detection batch applied",
        );
        self.batch = Some(batch);
        self.active_detection = None;
        self.last_measurement = None;
        self.status = Status::ReadyToMeasure;
        Ok(UploadOutcome::Applied { detections })
    }

    /// Upload and detect in one call, holding the session throughout.
    pub async fn upload(&mut self, image: &ImageUpload) -> Result<UploadOutcome, SessionError> {
        let ticket = self.begin_upload(image)?;
        let result = self.services.detector.detect(image).await;
        self.complete_upload(ticket, result)
    }

    // ---- measuring ----

    /// Map a pointer event to a detection and measure it.
    ///
    /// `bitmap` is the canvas bitmap resolution; the image is assumed to be
    /// stretched to fill it.
    pub async fn tap(
        &mut self,
        pointer: PointerPosition,
        rect: CanvasRect,
        bitmap: ImageSize,
    ) -> Result<TapOutcome, SessionError> {
        if let Err(e) = self.calibration.require_calibrated() {
            return Err(self.fail(e.into()));
        }

        let hit = self.batch.as_ref().and_then(|batch| {
            let scale = DrawScale::stretch(bitmap, batch.image)?;
            hit_test::hit_test(&batch.detections, pointer, rect, bitmap, scale).cloned()
        });

        match hit {
            Some(detection) => self.engage(detection).await,
            None => {
                self.status = Status::NoHit;
                Ok(TapOutcome::NoHit)
            }
        }
    }

    /// Measure a detection of the current batch by id, with the same guards
    /// as a tap.
    pub async fn select(&mut self, id: DetectionId) -> Result<TapOutcome, SessionError> {
        if let Err(e) = self.calibration.require_calibrated() {
            return Err(self.fail(e.into()));
        }
        let detection = self
            .batch
            .as_ref()
            .and_then(|batch| batch.find(id))
            .cloned()
            .ok_or(SessionError::UnknownDetection(id))?;
        self.engage(detection).await
    }

    async fn engage(&mut self, detection: Detection) -> Result<TapOutcome, SessionError> {
        self.active_detection = Some(detection.id);

        match policy::check_measurable(&detection, self.accurate_mode) {
            PolicyDecision::LowConfidence { confidence } => {
                self.status = Status::LowConfidence { confidence };
                Ok(TapOutcome::LowConfidence {
                    detection,
                    confidence,
                })
            }
            PolicyDecision::AnchorOnly => {
                self.status = Status::AnchorOnly;
                Ok(TapOutcome::AnchorOnly { detection })
            }
            PolicyDecision::Allowed => match self.measure(&detection, true).await {
                Ok(measurement) => {
                    let label = measurement.detection.label.clone();
                    self.status = if measurement.estimate_mode.is_experimental() {
                        Status::ExperimentalEstimate { label }
                    } else {
                        Status::TargetLocked { label }
                    };
                    Ok(TapOutcome::Measured { measurement })
                }
                Err(e) => Err(self.fail(e)),
            },
        }
    }

    /// Measure one detection. On success the result becomes the last
    /// measurement and, when `add_to_log` is set, a new log entry.
    ///
    /// A dimensions record fetched here stays cached even when the distance
    /// call that follows fails.
    pub async fn measure(
        &mut self,
        detection: &Detection,
        add_to_log: bool,
    ) -> Result<Measurement, SessionError> {
        self.calibration.require_calibrated()?;
        let started = Instant::now();

        let reference = match detection.width_source {
            WidthSource::Anchor { width_mm } => ReferenceWidth::Anchor(width_mm),
            WidthSource::Heuristic => {
                let dims = self
                    .dimensions
                    .get_or_fetch(&detection.label, self.services.dimensions.as_ref())
                    .await
                    .map_err(|source| SessionError::DimensionsUnavailable {
                        label: detection.label.clone(),
                        source,
                    })?;
                ReferenceWidth::Heuristic(dims)
            }
        };
        let resolved = reference.resolve(&detection.bbox);

        let request = MeasureRequest {
            pixel_width: detection.bbox.width,
            real_width_mm: resolved.width_mm,
            focal_constant: self.calibration.focal_constant,
        };
        let distance_m = self
            .services
            .distance
            .measure(&request)
            .await
            .map_err(SessionError::MeasurementService)?;

        let measurement = Measurement {
            detection: detection.clone(),
            reference_width_mm: resolved.width_mm,
            distance_m,
            estimate_mode: resolved.mode,
            focal_constant: request.focal_constant,
        };
        if add_to_log {
            self.log.append(measurement.to_log_entry(Utc::now()));
        }
        self.last_measurement = Some(measurement.clone());

        tracing::info!(
            label = %detection.label,
            distance_m,
            reference_width_mm = resolved.width_mm,
            pixel_width = request.pixel_width,
            focal_constant = request.focal_constant,
            mode = ?resolved.mode,
            logged = add_to_log,
            latency_ms = started.elapsed().as_millis() as u64,
            "Measured distance",
        );
        Ok(measurement)
    }

    // ---- settings ----

    /// Change the display unit. Stored values stay in meters.
    pub fn set_unit(&mut self, unit: DistanceUnit) {
        self.unit = unit;
    }

    /// Affects subsequent taps only.
    pub fn set_accurate_mode(&mut self, enabled: bool) {
        self.accurate_mode = enabled;
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        self.status = Status::for_error(&err);
        err
    }
}
