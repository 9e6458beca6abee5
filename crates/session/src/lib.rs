//! Measurement session orchestration.
//!
//! Ties calibration, detection batches, reference-width resolution and the
//! session log together on top of the inference collaborators.

pub mod cache;
pub mod error;
pub mod session;
pub mod status;
pub mod view;

pub use error::SessionError;
pub use session::{
    Collaborators, Session, SessionSettings, TapOutcome, UploadOutcome, UploadTicket,
};
pub use status::Status;
