/// Task board entries are addressed by small positive integers.
pub type TaskId = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
