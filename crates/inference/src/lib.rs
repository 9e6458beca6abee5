//! Clients for the SemaDepth inference collaborators.
//!
//! Defines the async contracts for detection, canonical dimensions, distance
//! evaluation and guided calibration, an HTTP implementation backed by
//! [`reqwest`], and an in-process guided calibrator.

pub mod api;
pub mod error;
pub mod local_calibrator;
pub mod service;
pub mod wire;

pub use api::InferenceApi;
pub use error::ServiceError;
pub use service::{Calibrator, Detector, DimensionsSource, DistanceService, ImageUpload};
