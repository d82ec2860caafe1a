use thiserror::Error;

/// Errors that can arise while reading or writing save-game blobs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// JSON encoding or decoding of a table failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encoding or decoding of a table failed.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("store poisoned")]
    Poisoned,

    /// A background save task could not be joined.
    #[error("background task failed: {0}")]
    Task(String),
}
