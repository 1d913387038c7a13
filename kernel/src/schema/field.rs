//! Field descriptors: value types, cardinality, and presence.
//!
//! A [`FieldDescriptor`] is the unit the iteration protocol and the
//! comparison engines dispatch on. Every variant set here is closed, so each
//! consumer matches exhaustively instead of querying kinds at runtime.

use std::sync::Arc;

use crate::schema::descriptor::MessageSchema;
use crate::wire::WireType;

/// Scalar field kinds.
///
/// Several kinds share one in-memory representation (`Int32`, `SInt32`,
/// `SFixed32` and `Enum` all store an `i32`); they differ only on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Float,
    Double,
    Enum,
}

impl ScalarKind {
    /// Declared storage width in bytes.
    ///
    /// Scalar equality compares exactly this many bytes of the bit pattern.
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int32
            | Self::UInt32
            | Self::SInt32
            | Self::Fixed32
            | Self::SFixed32
            | Self::Float
            | Self::Enum => 4,
            Self::Int64
            | Self::UInt64
            | Self::SInt64
            | Self::Fixed64
            | Self::SFixed64
            | Self::Double => 8,
        }
    }

    /// Wire type used for a single (unpacked) value of this kind.
    #[must_use]
    pub const fn wire_type(self) -> WireType {
        match self {
            Self::Bool
            | Self::Int32
            | Self::Int64
            | Self::UInt32
            | Self::UInt64
            | Self::SInt32
            | Self::SInt64
            | Self::Enum => WireType::Varint,
            Self::Fixed32 | Self::SFixed32 | Self::Float => WireType::ThirtyTwoBit,
            Self::Fixed64 | Self::SFixed64 | Self::Double => WireType::SixtyFourBit,
        }
    }

    /// Whether this kind may be used as a map key.
    #[must_use]
    pub const fn is_valid_map_key(self) -> bool {
        !matches!(self, Self::Float | Self::Double | Self::Enum)
    }
}

/// The type of a single value: one scalar, one string, one byte string, or
/// one submessage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Scalar(ScalarKind),
    String,
    Bytes,
    /// Submessage with a link to its nested schema.
    Message(Arc<MessageSchema>),
}

impl ValueType {
    /// True for `String` and `Bytes`.
    #[must_use]
    pub const fn is_string_view(&self) -> bool {
        matches!(self, Self::String | Self::Bytes)
    }

    /// The nested schema, for message-typed values.
    #[must_use]
    pub fn sub_schema(&self) -> Option<&Arc<MessageSchema>> {
        match self {
            Self::Message(schema) => Some(schema),
            _ => None,
        }
    }

    /// Wire type used for a single value of this type.
    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::Scalar(kind) => kind.wire_type(),
            Self::String | Self::Bytes | Self::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Short human-readable name, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(kind) => format!("{kind:?}").to_lowercase(),
            Self::String => "string".into(),
            Self::Bytes => "bytes".into(),
            Self::Message(schema) => format!("message {}", schema.full_name()),
        }
    }
}

/// Cardinality of a field together with its value type(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// At most one value.
    Singular(ValueType),
    /// Ordered sequence of values.
    Repeated { element: ValueType, packed: bool },
    /// Unordered key/value associations with unique keys.
    Map { key: ValueType, value: ValueType },
}

/// How a field distinguishes "unset" from "set to the default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// No has-bit: a zero value is indistinguishable from unset.
    Implicit,
    /// Has-bit: "set to zero" and "unset" differ.
    Explicit,
    /// Member of the oneof with this index; at most one member is set.
    Oneof(u16),
}

impl Presence {
    /// Whether the field carries a has-bit (explicit or oneof).
    #[must_use]
    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Implicit)
    }
}

/// A single base field (or the field half of an extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub(crate) number: u32,
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) presence: Presence,
}

impl FieldDescriptor {
    /// Field number (wire tag number).
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cardinality and value type(s).
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Presence discipline.
    #[must_use]
    pub const fn presence(&self) -> Presence {
        self.presence
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.kind, FieldKind::Repeated { .. })
    }

    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self.kind, FieldKind::Map { .. })
    }

    /// True for a singular message-typed field.
    #[must_use]
    pub const fn is_submessage(&self) -> bool {
        matches!(self.kind, FieldKind::Singular(ValueType::Message(_)))
    }

    /// Nested schema for message-typed singular or repeated fields, or for
    /// maps with message values.
    #[must_use]
    pub fn sub_schema(&self) -> Option<&Arc<MessageSchema>> {
        match &self.kind {
            FieldKind::Singular(vt) | FieldKind::Repeated { element: vt, .. } => vt.sub_schema(),
            FieldKind::Map { value, .. } => value.sub_schema(),
        }
    }
}
