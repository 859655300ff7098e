use loam_types::{ObjectId, TypeError};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The lookup key is too short, too long, or not hex.
    #[error("invalid object prefix `{prefix}`: {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    /// No stored object matches the prefix.
    #[error("object not found: {0}")]
    NotFound(String),

    /// More than one stored object matches the prefix.
    #[error("object prefix `{prefix}` is ambiguous: {matches} objects match")]
    AmbiguousPrefix { prefix: String, matches: usize },

    /// The object data cannot be decoded.
    #[error("corrupt object {object}: {reason}")]
    CorruptObject { object: String, reason: String },

    /// The decoded object does not hash to the id it was stored under.
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        expected: ObjectId,
        computed: ObjectId,
    },

    /// Repository configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
