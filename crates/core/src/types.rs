/// Opaque record identifier assigned by the request store.
pub type RequestId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
