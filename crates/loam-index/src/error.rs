//! Error types for the index crate.

use loam_types::ObjectId;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The header is malformed or the file is too short to hold one.
    #[error("bad index header: {0}")]
    BadHeader(String),

    /// The trailing digest does not match the file contents.
    #[error("index checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    /// The header's entry count disagrees with the entries present.
    #[error("index declares {declared} entries but contains {parsed}")]
    CountMismatch { declared: usize, parsed: usize },

    /// An entry could not be decoded.
    #[error("corrupt index entry at offset {offset}: {reason}")]
    CorruptEntry { offset: usize, reason: String },

    /// A path that cannot be stored in the index.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Two entries share a path.
    #[error("duplicate path in index: {0}")]
    DuplicatePath(String),

    /// An object referenced by an entry was not found in the store.
    #[error("object not found in store: {0}")]
    ObjectNotFound(ObjectId),

    /// Record codec failure.
    #[error("record format error: {0}")]
    Format(#[from] loam_codec::FormatError),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] loam_store::StoreError),

    /// I/O error reading or writing the index or working tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
