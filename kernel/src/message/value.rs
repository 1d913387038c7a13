//! Values: owned field values, borrowed views, and map keys.
//!
//! [`MessageValue`] is the common currency of the comparison routines: a
//! borrowed, `Copy` tagged union over everything a field slot can hold.
//! [`Value`] is its owned counterpart, used when building messages.

use crate::message::array::Array;
use crate::message::map::Map;
use crate::message::storage::Message;
use crate::message::MessageError;
use crate::schema::field::{ScalarKind, ValueType};

/// A scalar in its storage representation.
///
/// `PartialEq` is bit-pattern equality within the same variant, so
/// `Float(f32::NAN) == Float(f32::NAN)` holds for identical NaN bits and
/// `Double(0.0) != Double(-0.0)`.
#[derive(Debug, Clone, Copy)]
pub enum ScalarValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
}

impl ScalarValue {
    /// The zero value for `kind`.
    #[must_use]
    pub const fn zero(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool(false),
            ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 | ScalarKind::Enum => {
                Self::Int32(0)
            }
            ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64 => Self::Int64(0),
            ScalarKind::UInt32 | ScalarKind::Fixed32 => Self::UInt32(0),
            ScalarKind::UInt64 | ScalarKind::Fixed64 => Self::UInt64(0),
            ScalarKind::Float => Self::Float(0.0),
            ScalarKind::Double => Self::Double(0.0),
        }
    }

    /// Whether this representation stores values of `kind`.
    #[must_use]
    pub const fn fits(self, kind: ScalarKind) -> bool {
        matches!(
            (self, kind),
            (Self::Bool(_), ScalarKind::Bool)
                | (
                    Self::Int32(_),
                    ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 | ScalarKind::Enum
                )
                | (
                    Self::Int64(_),
                    ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64
                )
                | (Self::UInt32(_), ScalarKind::UInt32 | ScalarKind::Fixed32)
                | (Self::UInt64(_), ScalarKind::UInt64 | ScalarKind::Fixed64)
                | (Self::Float(_), ScalarKind::Float)
                | (Self::Double(_), ScalarKind::Double)
        )
    }

    /// Storage width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Bool(_) => 1,
            Self::Int32(_) | Self::UInt32(_) | Self::Float(_) => 4,
            Self::Int64(_) | Self::UInt64(_) | Self::Double(_) => 8,
        }
    }

    /// The stored bit pattern, zero-extended to 64 bits.
    #[must_use]
    pub fn raw_bits(self) -> u64 {
        match self {
            Self::Bool(b) => u64::from(b),
            Self::Int32(v) => u64::from(u32::from_ne_bytes(v.to_ne_bytes())),
            Self::Int64(v) => u64::from_ne_bytes(v.to_ne_bytes()),
            Self::UInt32(v) => u64::from(v),
            Self::UInt64(v) => v,
            Self::Float(v) => u64::from(v.to_bits()),
            Self::Double(v) => v.to_bits(),
        }
    }

    /// Fixed-width raw comparison: same width, same bits.
    ///
    /// This is the scalar equality used by every comparison routine. Two
    /// NaNs with different payloads differ; `0.0` and `-0.0` differ.
    #[must_use]
    pub fn raw_eq(self, other: Self) -> bool {
        self.width() == other.width() && self.raw_bits() == other.raw_bits()
    }

    /// True for the all-zero bit pattern (`-0.0` is not zero here).
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.raw_bits() == 0
    }

    fn variant_name(self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int32(_) => "i32",
            Self::Int64(_) => "i64",
            Self::UInt32(_) => "u32",
            Self::UInt64(_) => "u64",
            Self::Float(_) => "f32",
            Self::Double(_) => "f64",
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self.raw_bits() == other.raw_bits()
    }
}

impl Eq for ScalarValue {}

/// Borrowed view of a field, array element, map value, or extension.
#[derive(Debug, Clone, Copy)]
pub enum MessageValue<'a> {
    Scalar(ScalarValue),
    /// String or bytes payload.
    Bytes(&'a [u8]),
    /// Array handle; `None` when the slot has never been materialized.
    Array(Option<&'a Array>),
    /// Map handle; `None` when the slot has never been materialized.
    Map(Option<&'a Map>),
    /// Submessage handle; `None` when unset.
    Message(Option<&'a Message>),
}

impl<'a> MessageValue<'a> {
    #[must_use]
    pub const fn scalar(self) -> Option<ScalarValue> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn bytes(self) -> Option<&'a [u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The payload as UTF-8, if it is a string view holding valid UTF-8.
    #[must_use]
    pub fn as_str(self) -> Option<&'a str> {
        self.bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    #[must_use]
    pub const fn array(self) -> Option<&'a Array> {
        match self {
            Self::Array(a) => a,
            _ => None,
        }
    }

    #[must_use]
    pub const fn map(self) -> Option<&'a Map> {
        match self {
            Self::Map(m) => m,
            _ => None,
        }
    }

    #[must_use]
    pub const fn message(self) -> Option<&'a Message> {
        match self {
            Self::Message(m) => m,
            _ => None,
        }
    }
}

/// Owned single value: the input type for setters and container inserts.
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(ScalarValue),
    Bytes(Vec<u8>),
    Message(Box<Message>),
}

impl Value {
    /// Borrowed view of this value.
    #[must_use]
    pub fn view(&self) -> MessageValue<'_> {
        match self {
            Self::Scalar(v) => MessageValue::Scalar(*v),
            Self::Bytes(b) => MessageValue::Bytes(b),
            Self::Message(m) => MessageValue::Message(Some(m.as_ref())),
        }
    }

    /// Check that this value can be stored under `ty`.
    ///
    /// # Errors
    ///
    /// [`MessageError::TypeMismatch`] for the wrong representation or a
    /// submessage of another schema; [`MessageError::InvalidUtf8`] for a
    /// string payload that is not UTF-8.
    pub fn check(&self, ty: &ValueType) -> Result<(), MessageError> {
        let ok = match (self, ty) {
            (Self::Scalar(v), ValueType::Scalar(kind)) => v.fits(*kind),
            (Self::Bytes(b), ValueType::String) => {
                if std::str::from_utf8(b).is_err() {
                    return Err(MessageError::InvalidUtf8);
                }
                true
            }
            (Self::Bytes(_), ValueType::Bytes) => true,
            (Self::Message(m), ValueType::Message(schema)) => m.schema().same_shape(schema),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(MessageError::TypeMismatch {
                expected: ty.describe(),
                found: self.describe(),
            })
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Scalar(v) => v.variant_name().into(),
            Self::Bytes(_) => "bytes".into(),
            Self::Message(m) => format!("message {}", m.schema().full_name()),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Scalar(ScalarValue::$variant(v))
                }
            }
        )+
    };
}

scalar_from! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
}

impl From<ScalarValue> for Value {
    fn from(v: ScalarValue) -> Self {
        Self::Scalar(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Self::Message(Box::new(m))
    }
}

/// Map key. Keys are integral, bool, or string.
///
/// `Ord` gives the deterministic entry order used by the canonical encoder:
/// numeric order for integers, `false < true`, byte order for strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    String(String),
}

impl MapKey {
    /// Whether this key can be stored under key type `ty`.
    #[must_use]
    pub fn fits(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Self::String(_), ValueType::String) => true,
            (Self::Bool(_), ValueType::Scalar(kind)) => *kind == ScalarKind::Bool,
            (Self::Int32(v), ValueType::Scalar(kind)) => {
                *kind != ScalarKind::Enum && ScalarValue::Int32(*v).fits(*kind)
            }
            (Self::Int64(v), ValueType::Scalar(kind)) => ScalarValue::Int64(*v).fits(*kind),
            (Self::UInt32(v), ValueType::Scalar(kind)) => ScalarValue::UInt32(*v).fits(*kind),
            (Self::UInt64(v), ValueType::Scalar(kind)) => ScalarValue::UInt64(*v).fits(*kind),
            _ => false,
        }
    }

    /// The key as a field value (for encoding the entry's key field).
    #[must_use]
    pub fn view(&self) -> MessageValue<'_> {
        match self {
            Self::Bool(v) => MessageValue::Scalar(ScalarValue::Bool(*v)),
            Self::Int32(v) => MessageValue::Scalar(ScalarValue::Int32(*v)),
            Self::Int64(v) => MessageValue::Scalar(ScalarValue::Int64(*v)),
            Self::UInt32(v) => MessageValue::Scalar(ScalarValue::UInt32(*v)),
            Self::UInt64(v) => MessageValue::Scalar(ScalarValue::UInt64(*v)),
            Self::String(s) => MessageValue::Bytes(s.as_bytes()),
        }
    }
}

impl From<bool> for MapKey {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for MapKey {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u32> for MapKey {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<u64> for MapKey {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for MapKey {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
