pub mod calibration;
pub mod measurement;
pub mod session;
pub mod upload;
