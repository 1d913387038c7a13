//! Structural equality: deep comparison of field values.
//!
//! # Phases
//!
//! 1. Identity: a message is equal to itself.
//! 2. Schema: both messages must have been built from the schema given
//!    (or a structurally identical one).
//! 3. Base fields: two cursors advance in lock-step. Both must reach the
//!    same field numbers in the same order and hold equal values there.
//!    This relies on the ascending-number scan order of the cursors.
//! 4. Extensions: same count, and every extension of the first message is
//!    present in the second (by descriptor identity) with an equal value.
//! 5. Unknown fields: the trailers must compare `Equal`; exceeding a limit
//!    stops the comparison with an error.
//!
//! A field that is "set to its default" under implicit presence is invisible
//! to the cursors, so it compares equal to an unset field. Explicit presence
//! is visible, so a set zero differs from unset.

use std::ptr;
use std::sync::Arc;

use msgcmp_kernel::message::iter::{next_base_field, Extensions, FieldCursor};
use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::message::value::MessageValue;
use msgcmp_kernel::schema::descriptor::MessageSchema;
use msgcmp_kernel::schema::field::{FieldDescriptor, FieldKind, ValueType};
use msgcmp_kernel::wire::unknown::{unknown_fields_equal, UnknownCompareResult, UnknownLimits};
use tracing::debug;

use crate::container::{array_equal, map_equal};
use crate::error::CompareError;
use crate::policy::ComparePolicyV1;

/// Check that `msg` belongs to `schema`.
pub(crate) fn check_schema(msg: &Message, schema: &Arc<MessageSchema>) -> Result<(), CompareError> {
    if msg.schema().same_shape(schema) {
        Ok(())
    } else {
        Err(CompareError::SchemaMismatch {
            expected: schema.full_name().into(),
            found: msg.schema().full_name().into(),
        })
    }
}

/// Structural comparison state: the resolved policy knobs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Engine {
    limits: UnknownLimits,
    include_unknown: bool,
}

impl Engine {
    pub(crate) const fn new(policy: &ComparePolicyV1) -> Self {
        Self {
            limits: policy.unknown_limits(),
            include_unknown: policy.include_unknown_fields,
        }
    }

    pub(crate) fn message(
        &self,
        m1: &Message,
        m2: &Message,
        schema: &Arc<MessageSchema>,
    ) -> Result<bool, CompareError> {
        if ptr::eq(m1, m2) {
            return Ok(true);
        }
        check_schema(m1, schema)?;
        check_schema(m2, schema)?;

        let mut c1 = FieldCursor::BEGIN;
        let mut c2 = FieldCursor::BEGIN;
        loop {
            match (
                next_base_field(m1, schema, &mut c1),
                next_base_field(m2, schema, &mut c2),
            ) {
                (None, None) => break,
                (Some((f1, v1)), Some((f2, v2))) => {
                    if f1.number() != f2.number() {
                        debug!(
                            schema = schema.full_name(),
                            left = f1.number(),
                            right = f2.number(),
                            "field sets differ"
                        );
                        return Ok(false);
                    }
                    if !self.field(f1, v1, v2)? {
                        debug!(
                            schema = schema.full_name(),
                            field = f1.number(),
                            "field values differ"
                        );
                        return Ok(false);
                    }
                }
                (Some((f, _)), None) | (None, Some((f, _))) => {
                    debug!(
                        schema = schema.full_name(),
                        field = f.number(),
                        "field present on one side only"
                    );
                    return Ok(false);
                }
            }
        }

        if m1.extension_count() != m2.extension_count() {
            debug!(
                schema = schema.full_name(),
                left = m1.extension_count(),
                right = m2.extension_count(),
                "extension counts differ"
            );
            return Ok(false);
        }
        for (ext, v1) in Extensions::new(m1) {
            let Some(v2) = m2.extension(ext) else {
                debug!(extension = ext.number(), "extension missing on right");
                return Ok(false);
            };
            if !self.field(ext.field(), v1, v2)? {
                debug!(extension = ext.number(), "extension values differ");
                return Ok(false);
            }
        }

        if !self.include_unknown {
            return Ok(true);
        }
        match unknown_fields_equal(m1.unknown(), m2.unknown(), &self.limits) {
            UnknownCompareResult::Equal => Ok(true),
            UnknownCompareResult::NotEqual => {
                debug!(schema = schema.full_name(), "unknown fields differ");
                Ok(false)
            }
            UnknownCompareResult::MaxDepthExceeded => Err(CompareError::UnknownDepthExceeded {
                limit: self.limits.max_depth,
            }),
            UnknownCompareResult::ResourceExhausted => Err(CompareError::UnknownBudgetExhausted {
                limit: self.limits.max_fields,
            }),
        }
    }

    fn field(
        &self,
        field: &FieldDescriptor,
        v1: MessageValue<'_>,
        v2: MessageValue<'_>,
    ) -> Result<bool, CompareError> {
        match field.kind() {
            FieldKind::Singular(ty) => self.value(ty, v1, v2),
            FieldKind::Repeated { element, .. } => array_equal(self, v1.array(), v2.array(), element),
            FieldKind::Map { value, .. } => map_equal(self, v1.map(), v2.map(), value),
        }
    }

    /// Equality of two single values of type `ty`.
    ///
    /// Scalars compare by bit pattern at their stored width, so NaNs with
    /// different payloads differ and `0.0 != -0.0`.
    pub(crate) fn value(
        &self,
        ty: &ValueType,
        v1: MessageValue<'_>,
        v2: MessageValue<'_>,
    ) -> Result<bool, CompareError> {
        match ty {
            ValueType::Message(sub) => self.submessage(v1.message(), v2.message(), sub),
            ValueType::String | ValueType::Bytes => Ok(matches!(
                (v1.bytes(), v2.bytes()),
                (Some(a), Some(b)) if a == b
            )),
            ValueType::Scalar(_) => Ok(matches!(
                (v1.scalar(), v2.scalar()),
                (Some(a), Some(b)) if a.raw_eq(b)
            )),
        }
    }

    fn submessage(
        &self,
        m1: Option<&Message>,
        m2: Option<&Message>,
        schema: &Arc<MessageSchema>,
    ) -> Result<bool, CompareError> {
        match (m1, m2) {
            (Some(a), Some(b)) => self.message(a, b, schema),
            (None, None) => Ok(true),
            // An unset handle reads as the empty message.
            (Some(m), None) | (None, Some(m)) => self.message(m, &Message::new(schema), schema),
        }
    }
}
