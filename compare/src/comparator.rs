//! `Comparator`: configured entry points for both equality engines.

use std::sync::Arc;

use msgcmp_kernel::message::array::Array;
use msgcmp_kernel::message::map::Map;
use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::proof::hash::ContentHash;
use msgcmp_kernel::schema::descriptor::MessageSchema;
use msgcmp_kernel::schema::field::ValueType;
use tracing::debug;

use crate::canonical;
use crate::container;
use crate::error::{CompareError, PolicyError};
use crate::outcome::CompareOutcome;
use crate::policy::ComparePolicyV1;
use crate::structural::Engine;

/// Message comparator bound to a validated [`ComparePolicyV1`].
///
/// A comparator holds no per-call state; one instance can serve any number
/// of comparisons, from any thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparator {
    policy: ComparePolicyV1,
}

impl Comparator {
    /// Build a comparator.
    ///
    /// # Errors
    ///
    /// Whatever [`ComparePolicyV1::validate`] rejects.
    pub fn new(policy: ComparePolicyV1) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    #[must_use]
    pub const fn policy(&self) -> &ComparePolicyV1 {
        &self.policy
    }

    /// Structural equality with a three-way verdict.
    #[must_use]
    pub fn compare(
        &self,
        m1: &Message,
        m2: &Message,
        schema: &Arc<MessageSchema>,
    ) -> CompareOutcome {
        let result = Engine::new(&self.policy).message(m1, m2, schema);
        log_incomplete("structural", schema, &result);
        result.into()
    }

    /// Exact (canonical encoding) equality with a three-way verdict.
    #[must_use]
    pub fn compare_exact(
        &self,
        m1: &Message,
        m2: &Message,
        schema: &Arc<MessageSchema>,
    ) -> CompareOutcome {
        let result = canonical::exactly_equal(&self.policy, m1, m2, schema);
        log_incomplete("exact", schema, &result);
        result.into()
    }

    /// Structural equality. Anything but a definite "equal" is `false`.
    #[must_use]
    pub fn is_equal(&self, m1: &Message, m2: &Message, schema: &Arc<MessageSchema>) -> bool {
        self.compare(m1, m2, schema).is_equal()
    }

    /// Exact equality. Encode failures are `false`.
    #[must_use]
    pub fn is_exactly_equal(
        &self,
        m1: &Message,
        m2: &Message,
        schema: &Arc<MessageSchema>,
    ) -> bool {
        self.compare_exact(m1, m2, schema).is_equal()
    }

    /// SHA-256 fingerprint of the canonical encoding.
    ///
    /// Two messages of one schema have the same fingerprint exactly when
    /// [`is_exactly_equal`](Self::is_exactly_equal) holds for them.
    ///
    /// # Errors
    ///
    /// [`CompareError::SchemaMismatch`] or [`CompareError::Encode`].
    pub fn exact_fingerprint(
        &self,
        msg: &Message,
        schema: &Arc<MessageSchema>,
    ) -> Result<ContentHash, CompareError> {
        canonical::fingerprint(&self.policy, msg, schema)
    }

    /// Ordered equality of two repeated-field arrays. `None` is empty.
    #[must_use]
    pub fn array_equal(&self, a1: Option<&Array>, a2: Option<&Array>, element: &ValueType) -> bool {
        container::array_equal(&Engine::new(&self.policy), a1, a2, element).unwrap_or(false)
    }

    /// Unordered equality of two map fields. `None` is empty.
    #[must_use]
    pub fn map_equal(&self, m1: Option<&Map>, m2: Option<&Map>, value_type: &ValueType) -> bool {
        container::map_equal(&Engine::new(&self.policy), m1, m2, value_type).unwrap_or(false)
    }
}

fn log_incomplete(engine: &str, schema: &MessageSchema, result: &Result<bool, CompareError>) {
    if let Err(e) = result {
        debug!(engine, schema = schema.full_name(), error = %e, "comparison incomplete");
    }
}
