//! Comparison policy.

use msgcmp_kernel::wire::encode::DEFAULT_ENCODE_DEPTH_LIMIT;
use msgcmp_kernel::wire::unknown::{
    UnknownLimits, DEFAULT_UNKNOWN_DEPTH_LIMIT, DEFAULT_UNKNOWN_FIELD_BUDGET,
};
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Upper bound accepted for either depth limit. Both limits bound recursion.
pub const MAX_DEPTH_CEILING: u32 = 1_000;

/// Limits and switches for structural and exact comparison.
///
/// Missing JSON keys take their defaults and unknown keys are ignored, so a
/// policy file written by a newer version still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparePolicyV1 {
    /// Group nesting limit for unknown-field trailers.
    pub max_unknown_depth: u32,
    /// Field budget per unknown-field trailer.
    pub max_unknown_fields: usize,
    /// Compare unknown-field trailers in structural equality.
    pub include_unknown_fields: bool,
    /// Submessage nesting limit for the canonical encoder.
    pub max_encode_depth: u32,
    /// Byte budget for the scratch arena used by exact comparison.
    /// `None` means unbounded.
    pub max_scratch_bytes: Option<usize>,
}

impl ComparePolicyV1 {
    /// Check every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(1..=MAX_DEPTH_CEILING).contains(&self.max_unknown_depth) {
            return Err(PolicyError::InvalidValue {
                field: "max_unknown_depth",
                detail: format!(
                    "{} is outside 1..={MAX_DEPTH_CEILING}",
                    self.max_unknown_depth
                ),
            });
        }
        if !(1..=MAX_DEPTH_CEILING).contains(&self.max_encode_depth) {
            return Err(PolicyError::InvalidValue {
                field: "max_encode_depth",
                detail: format!(
                    "{} is outside 1..={MAX_DEPTH_CEILING}",
                    self.max_encode_depth
                ),
            });
        }
        if self.max_unknown_fields == 0 {
            return Err(PolicyError::InvalidValue {
                field: "max_unknown_fields",
                detail: "must be at least 1".into(),
            });
        }
        if self.max_scratch_bytes == Some(0) {
            return Err(PolicyError::InvalidValue {
                field: "max_scratch_bytes",
                detail: "must be positive when set".into(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON policy document.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Parse`] for malformed JSON or mistyped values, then
    /// anything [`validate`](Self::validate) rejects.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json).map_err(|e| PolicyError::Parse {
            detail: e.to_string(),
        })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Limits handed to the unknown-field comparer.
    #[must_use]
    pub const fn unknown_limits(&self) -> UnknownLimits {
        UnknownLimits {
            max_depth: self.max_unknown_depth,
            max_fields: self.max_unknown_fields,
        }
    }
}

impl Default for ComparePolicyV1 {
    fn default() -> Self {
        Self {
            max_unknown_depth: DEFAULT_UNKNOWN_DEPTH_LIMIT,
            max_unknown_fields: DEFAULT_UNKNOWN_FIELD_BUDGET,
            include_unknown_fields: true,
            max_encode_depth: DEFAULT_ENCODE_DEPTH_LIMIT,
            max_scratch_bytes: None,
        }
    }
}
