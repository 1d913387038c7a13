//! Field iteration protocol: cursors over present base fields and extensions.
//!
//! # Determinism
//!
//! [`next_base_field`] visits fields in ascending schema index, which is
//! ascending field number (see [`crate::schema::descriptor`]). For a fixed
//! message and schema every full scan yields the same sequence. The
//! structural equality engine advances two cursors in lock-step and depends
//! on this.
//!
//! # Presence rules
//!
//! A base field is skipped when:
//! - it tracks presence and its has-bit is unset, or
//! - it does not track presence and its stored value is the all-zero
//!   representation (zero bits, empty payload, absent or empty container).
//!
//! Extensions have no notion of defaultedness: every stored entry is
//! yielded, in stored order.

use std::sync::Arc;

use crate::message::storage::Message;
use crate::message::value::MessageValue;
use crate::schema::descriptor::MessageSchema;
use crate::schema::extension::ExtensionDescriptor;
use crate::schema::field::FieldDescriptor;

/// Opaque position of a base-field scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCursor(Option<usize>);

impl FieldCursor {
    /// Start of a scan.
    pub const BEGIN: Self = Self(None);
}

impl Default for FieldCursor {
    fn default() -> Self {
        Self::BEGIN
    }
}

/// Opaque position of an extension scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionCursor(Option<usize>);

impl ExtensionCursor {
    /// Start of a scan.
    pub const BEGIN: Self = Self(None);
}

impl Default for ExtensionCursor {
    fn default() -> Self {
        Self::BEGIN
    }
}

/// Advance `cursor` to the next present base field of `msg`.
///
/// Returns `None` once the scan is exhausted; the cursor then stays
/// exhausted.
pub fn next_base_field<'a>(
    msg: &'a Message,
    schema: &'a MessageSchema,
    cursor: &mut FieldCursor,
) -> Option<(&'a FieldDescriptor, MessageValue<'a>)> {
    let mut i = cursor.0.map_or(0, |last| last + 1);
    while i < schema.field_count() {
        let (Some(field), Some(slot)) = (schema.field(i), msg.slot(i)) else {
            break;
        };
        let present = if field.presence().is_tracked() {
            slot.has
        } else {
            !slot.data.is_zero()
        };
        if present {
            cursor.0 = Some(i);
            return Some((field, slot.data.view()));
        }
        i += 1;
    }
    cursor.0 = Some(schema.field_count());
    None
}

/// Advance `cursor` to the next stored extension of `msg`.
pub fn next_extension<'a>(
    msg: &'a Message,
    cursor: &mut ExtensionCursor,
) -> Option<(&'a Arc<ExtensionDescriptor>, MessageValue<'a>)> {
    let i = cursor.0.map_or(0, |last| last + 1);
    let entry = msg.extension_entries().get(i)?;
    cursor.0 = Some(i);
    Some((&entry.ext, entry.data.view()))
}

/// True iff `msg` has no extensions and no present base field.
#[must_use]
pub fn is_empty(msg: &Message, schema: &MessageSchema) -> bool {
    let mut cursor = FieldCursor::BEGIN;
    msg.extension_count() == 0 && next_base_field(msg, schema, &mut cursor).is_none()
}

/// Iterator adapter over [`next_base_field`].
#[derive(Debug, Clone)]
pub struct BaseFields<'a> {
    msg: &'a Message,
    schema: &'a MessageSchema,
    cursor: FieldCursor,
}

impl<'a> BaseFields<'a> {
    #[must_use]
    pub const fn new(msg: &'a Message, schema: &'a MessageSchema) -> Self {
        Self {
            msg,
            schema,
            cursor: FieldCursor::BEGIN,
        }
    }
}

impl<'a> Iterator for BaseFields<'a> {
    type Item = (&'a FieldDescriptor, MessageValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        next_base_field(self.msg, self.schema, &mut self.cursor)
    }
}

/// Iterator adapter over [`next_extension`].
#[derive(Debug, Clone)]
pub struct Extensions<'a> {
    msg: &'a Message,
    cursor: ExtensionCursor,
}

impl<'a> Extensions<'a> {
    #[must_use]
    pub const fn new(msg: &'a Message) -> Self {
        Self {
            msg,
            cursor: ExtensionCursor::BEGIN,
        }
    }
}

impl<'a> Iterator for Extensions<'a> {
    type Item = (&'a Arc<ExtensionDescriptor>, MessageValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        next_extension(self.msg, &mut self.cursor)
    }
}
