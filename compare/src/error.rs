//! Typed comparison errors.
//!
//! `CompareError` marks a comparison that could not reach a verdict. The
//! boolean entry points report these as "not equal"; the rich entry points
//! surface them as [`crate::outcome::CompareOutcome::Incomplete`].

use msgcmp_kernel::wire::encode::EncodeError;

/// Why a comparison stopped without deciding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    /// A message was not built from the schema passed in.
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },
    /// An unknown-field trailer nests groups beyond the policy limit.
    #[error("unknown fields nest deeper than {limit} levels")]
    UnknownDepthExceeded { limit: u32 },
    /// An unknown-field trailer holds more fields than the policy allows.
    #[error("unknown fields exceed the budget of {limit} fields")]
    UnknownBudgetExhausted { limit: usize },
    /// The canonical encoder failed.
    #[error("canonical encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Policy load or validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid policy value for {field}: {detail}")]
    InvalidValue { field: &'static str, detail: String },
    #[error("policy JSON could not be parsed: {detail}")]
    Parse { detail: String },
}
