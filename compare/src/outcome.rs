//! Three-way comparison result.

use crate::error::CompareError;

/// Verdict of a rich comparison.
///
/// `Equal` and `NotEqual` are decisions. `Incomplete` means a limit or a
/// precondition stopped the comparison; the boolean entry points treat it
/// as not equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareOutcome {
    Equal,
    NotEqual,
    Incomplete(CompareError),
}

impl CompareOutcome {
    /// True only for [`CompareOutcome::Equal`].
    #[must_use]
    pub const fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    /// The error, if the comparison did not finish.
    #[must_use]
    pub const fn error(&self) -> Option<&CompareError> {
        match self {
            Self::Incomplete(e) => Some(e),
            Self::Equal | Self::NotEqual => None,
        }
    }
}

impl From<Result<bool, CompareError>> for CompareOutcome {
    fn from(result: Result<bool, CompareError>) -> Self {
        match result {
            Ok(true) => Self::Equal,
            Ok(false) => Self::NotEqual,
            Err(e) => Self::Incomplete(e),
        }
    }
}
