use thiserror::Error;

use crate::format::FieldType;

/// Errors from building descriptors or encoding/decoding records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unexpected format token: `{0}`")]
    UnknownToken(String),

    #[error("format has {expected} fields but only {actual} values were supplied")]
    MissingValues { expected: usize, actual: usize },

    #[error("value {index} does not match field `{expected}`: got {actual}")]
    TypeMismatch {
        index: usize,
        expected: FieldType,
        actual: &'static str,
    },

    #[error("value {index} is {len} bytes, longer than its {width}-byte span")]
    SpanOverflow { index: usize, width: usize, len: usize },

    #[error("buffer of {actual} bytes is shorter than the {expected}-byte format")]
    ShortBuffer { expected: usize, actual: usize },

    #[error("format width does not fit in memory")]
    FormatTooLarge,
}

/// Convenience alias for codec results.
pub type FormatResult<T> = Result<T, FormatError>;
