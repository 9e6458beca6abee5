/// Detection ids are unique within one batch only.
pub type DetectionId = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
