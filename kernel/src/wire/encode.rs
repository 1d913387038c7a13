//! Canonical encoder: message → protobuf wire bytes.
//!
//! The encoder discovers set fields through [`crate::message::iter`], so
//! "what is present" has exactly one definition shared with the comparison
//! engines. Output order:
//!
//! 1. base fields in ascending field number,
//! 2. extensions (sorted by number when `deterministic`),
//! 3. the unknown-field trailer, verbatim, unless `skip_unknown`.
//!
//! With `deterministic` set, map entries are emitted in [`MapKey`] order.
//! Two messages that are equal modulo map/extension insertion order then
//! encode to identical bytes.

use std::sync::Arc;

use prost::encoding::{encode_key, encode_varint};

use crate::message::iter::{BaseFields, Extensions};
use crate::message::storage::Message;
use crate::message::value::{MapKey, MessageValue, ScalarValue};
use crate::schema::descriptor::MessageSchema;
use crate::schema::field::{FieldDescriptor, FieldKind, ScalarKind, ValueType};
use crate::wire::arena::{ArenaBuf, ArenaError, ScratchArena};
use crate::wire::WireType;

/// Default submessage nesting limit for the encoder.
pub const DEFAULT_ENCODE_DEPTH_LIMIT: u32 = 100;

/// Encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Omit every unknown-field trailer, at every nesting level.
    pub skip_unknown: bool,
    /// Sort map entries by key and extensions by field number.
    pub deterministic: bool,
    /// Maximum submessage nesting. The top-level message is depth 0.
    pub max_depth: u32,
}

impl EncodeOptions {
    /// `skip_unknown` + `deterministic`: the encoding exact equality compares.
    pub const CANONICAL: Self = Self {
        skip_unknown: true,
        deterministic: true,
        max_depth: DEFAULT_ENCODE_DEPTH_LIMIT,
    };
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            skip_unknown: false,
            deterministic: false,
            max_depth: DEFAULT_ENCODE_DEPTH_LIMIT,
        }
    }
}

/// Error type for encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("submessage nesting exceeds {limit} levels")]
    MaxDepthExceeded { limit: u32 },
    #[error("message of {found} encoded with schema {expected}")]
    SchemaMismatch { expected: String, found: String },
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Encode `msg` under `schema`.
///
/// # Errors
///
/// [`EncodeError::SchemaMismatch`] if `msg` was not built from `schema` (or a
/// structurally identical schema); [`EncodeError::MaxDepthExceeded`] if
/// submessages nest deeper than `opts.max_depth`.
pub fn encode(
    msg: &Message,
    schema: &Arc<MessageSchema>,
    opts: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    if !msg.schema().same_shape(schema) {
        return Err(EncodeError::SchemaMismatch {
            expected: schema.full_name().into(),
            found: msg.schema().full_name().into(),
        });
    }
    let mut out = Vec::new();
    Encoder { opts }.message(msg, schema, 0, &mut out)?;
    tracing::trace!(
        schema = schema.full_name(),
        bytes = out.len(),
        "message encoded"
    );
    Ok(out)
}

/// Encode into `arena`. The returned handle is valid until the arena drops.
///
/// # Errors
///
/// As for [`encode`], plus [`EncodeError::Arena`] when the arena's byte
/// budget is exhausted.
pub fn encode_in(
    msg: &Message,
    schema: &Arc<MessageSchema>,
    opts: &EncodeOptions,
    arena: &mut ScratchArena,
) -> Result<ArenaBuf, EncodeError> {
    let bytes = encode(msg, schema, opts)?;
    Ok(arena.alloc(bytes)?)
}

struct Encoder<'o> {
    opts: &'o EncodeOptions,
}

impl Encoder<'_> {
    fn message(
        &self,
        msg: &Message,
        schema: &MessageSchema,
        depth: u32,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        if depth >= self.opts.max_depth {
            return Err(EncodeError::MaxDepthExceeded {
                limit: self.opts.max_depth,
            });
        }

        for (field, value) in BaseFields::new(msg, schema) {
            self.field(field, value, depth, out)?;
        }

        let mut extensions: Vec<_> = Extensions::new(msg).collect();
        if self.opts.deterministic {
            extensions.sort_by_key(|(ext, _)| ext.number());
        }
        for (ext, value) in extensions {
            self.field(ext.field(), value, depth, out)?;
        }

        if !self.opts.skip_unknown {
            out.extend_from_slice(msg.unknown());
        }
        Ok(())
    }

    fn field(
        &self,
        field: &FieldDescriptor,
        value: MessageValue<'_>,
        depth: u32,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        let number = field.number();
        match field.kind() {
            FieldKind::Singular(ty) => self.value(number, ty, value, depth, out),
            FieldKind::Repeated { element, packed } => {
                let Some(array) = value.array() else {
                    return Ok(());
                };
                if array.is_empty() {
                    return Ok(());
                }
                match element {
                    ValueType::Scalar(kind) if *packed => {
                        let mut body = Vec::new();
                        for item in array.iter() {
                            if let Some(v) = item.scalar() {
                                put_scalar(*kind, v, &mut body);
                            }
                        }
                        put_delimited(number, &body, out);
                        Ok(())
                    }
                    _ => {
                        for item in array.iter() {
                            self.value(number, element, item, depth, out)?;
                        }
                        Ok(())
                    }
                }
            }
            FieldKind::Map { key, value: value_ty } => {
                let Some(map) = value.map() else {
                    return Ok(());
                };
                let mut entries: Vec<(&MapKey, MessageValue<'_>)> = map.iter().collect();
                if self.opts.deterministic {
                    entries.sort_by(|a, b| a.0.cmp(b.0));
                }
                for (k, v) in entries {
                    let mut body = Vec::new();
                    self.value(1, key, k.view(), depth, &mut body)?;
                    self.value(2, value_ty, v, depth, &mut body)?;
                    put_delimited(number, &body, out);
                }
                Ok(())
            }
        }
    }

    fn value(
        &self,
        number: u32,
        ty: &ValueType,
        value: MessageValue<'_>,
        depth: u32,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        match (ty, value) {
            (ValueType::Scalar(kind), MessageValue::Scalar(v)) => {
                encode_key(number, kind.wire_type(), out);
                put_scalar(*kind, v, out);
            }
            (ValueType::String | ValueType::Bytes, MessageValue::Bytes(b)) => {
                put_delimited(number, b, out);
            }
            (ValueType::Message(sub), MessageValue::Message(m)) => {
                let mut body = Vec::new();
                // An unset handle encodes as an empty submessage.
                if let Some(m) = m {
                    self.message(m, sub, depth + 1, &mut body)?;
                } else if depth + 1 >= self.opts.max_depth {
                    return Err(EncodeError::MaxDepthExceeded {
                        limit: self.opts.max_depth,
                    });
                }
                put_delimited(number, &body, out);
            }
            (ty, value) => {
                return Err(EncodeError::SchemaMismatch {
                    expected: ty.describe(),
                    found: describe_view(value).into(),
                });
            }
        }
        Ok(())
    }
}

fn put_delimited(number: u32, body: &[u8], out: &mut Vec<u8>) {
    encode_key(number, WireType::LengthDelimited, out);
    encode_varint(body.len() as u64, out);
    out.extend_from_slice(body);
}

/// Scalar payload without its tag.
#[allow(clippy::cast_sign_loss)]
fn put_scalar(kind: ScalarKind, v: ScalarValue, out: &mut Vec<u8>) {
    match (kind, v) {
        (ScalarKind::SInt32, ScalarValue::Int32(x)) => {
            encode_varint(u64::from(((x << 1) ^ (x >> 31)) as u32), out);
        }
        (ScalarKind::SInt64, ScalarValue::Int64(x)) => {
            encode_varint(((x << 1) ^ (x >> 63)) as u64, out);
        }
        // Negative int32/enum values are sign-extended to ten bytes.
        (ScalarKind::Int32 | ScalarKind::Enum, ScalarValue::Int32(x)) => {
            encode_varint(i64::from(x) as u64, out);
        }
        _ => match kind.wire_type() {
            WireType::ThirtyTwoBit => {
                let bits = v.raw_bits().to_le_bytes();
                out.extend_from_slice(&bits[..4]);
            }
            WireType::SixtyFourBit => out.extend_from_slice(&v.raw_bits().to_le_bytes()),
            _ => encode_varint(v.raw_bits(), out),
        },
    }
}

const fn describe_view(value: MessageValue<'_>) -> &'static str {
    match value {
        MessageValue::Scalar(_) => "scalar",
        MessageValue::Bytes(_) => "bytes",
        MessageValue::Array(_) => "array",
        MessageValue::Map(_) => "map",
        MessageValue::Message(_) => "message",
    }
}
