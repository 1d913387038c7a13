//! Message module: runtime message storage and the field iteration protocol.
//!
//! Depends on `schema`. The iteration protocol in [`iter`] is the only way
//! the comparison engines and the encoder discover which fields are set.

pub mod array;
pub mod iter;
pub mod map;
pub mod storage;
pub mod value;

/// Error type for message construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("{schema}: no field numbered {number}")]
    NoSuchField { schema: String, number: u32 },
    #[error("{field}: {detail}")]
    WrongCardinality { field: String, detail: String },
    #[error("expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("map key {found} does not fit key type {expected}")]
    KeyMismatch { expected: String, found: String },
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("extension {extension} extends {extendee}, not {schema}")]
    ExtendeeMismatch {
        extension: String,
        extendee: String,
        schema: String,
    },
    #[error("{schema}: extension number {number} is already set by a different extension")]
    ConflictingExtension { schema: String, number: u32 },
}
