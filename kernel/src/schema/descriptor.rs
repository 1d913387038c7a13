//! `MessageSchema`: the immutable, shared description of one message type.
//!
//! # Ordering invariant
//!
//! Fields are stored in ascending field-number order. The field iteration
//! protocol walks them by index, and the structural equality engine advances
//! two cursors in lock-step over the same schema; both rely on index order
//! being a pure function of the schema. [`SchemaBuilder::build`] establishes
//! the order, whatever order fields were declared in.
//!
//! Schemas are shared through `Arc` and never mutated after `build()`.
//! Nested schemas are linked by `Arc`, so schemas are acyclic by construction.

use std::collections::BTreeSet;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::schema::field::{FieldDescriptor, FieldKind, Presence, ScalarKind, ValueType};

/// Largest legal field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Field numbers reserved by the wire format implementation.
pub const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

/// Error type for schema and extension construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{schema}: field number {number} is outside 1..=536870911 or reserved")]
    InvalidFieldNumber { schema: String, number: u32 },
    #[error("{schema}: field number {number} declared more than once")]
    DuplicateFieldNumber { schema: String, number: u32 },
    #[error("{schema}: field name {name:?} declared more than once")]
    DuplicateFieldName { schema: String, name: String },
    #[error("{schema}.{field}: {detail}")]
    InvalidPresence {
        schema: String,
        field: String,
        detail: String,
    },
    #[error("{schema}.{field}: map key type {key} is not allowed")]
    InvalidMapKey {
        schema: String,
        field: String,
        key: String,
    },
    #[error("{schema}.{field}: packed encoding requires scalar elements")]
    InvalidPacked { schema: String, field: String },
}

/// Compiled, immutable description of a message type.
///
/// Equality is structural and O(1): two schemas are equal when their shape
/// digests match. The digest is computed once in [`SchemaBuilder::build`]
/// from the name, every field, and the digests of nested schemas.
#[derive(Debug, Clone)]
pub struct MessageSchema {
    full_name: String,
    fields: Vec<FieldDescriptor>,
    shape: [u8; 32],
}

impl PartialEq for MessageSchema {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl Eq for MessageSchema {}

impl MessageSchema {
    /// Fully-qualified message name (e.g. `"pkg.Outer"`).
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Number of base fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field by schema index. Indexes follow ascending field number.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// All fields in schema order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Schema index of the field with this number.
    #[must_use]
    pub fn index_of(&self, number: u32) -> Option<usize> {
        self.fields
            .binary_search_by_key(&number, FieldDescriptor::number)
            .ok()
    }

    /// Field with this number.
    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.index_of(number).map(|i| &self.fields[i])
    }

    /// Whether `other` describes the same message type.
    ///
    /// Pointer identity is checked first; otherwise the shape digests are
    /// compared, so the cost does not depend on how deep the schemas nest.
    #[must_use]
    pub fn same_shape(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other) || self.shape == other.shape
    }
}

/// Builder for [`MessageSchema`].
///
/// Fields may be declared in any order; `build()` sorts them by number and
/// validates the whole set.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    full_name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field with an explicit kind and presence.
    #[must_use]
    pub fn field(
        mut self,
        number: u32,
        name: impl Into<String>,
        kind: FieldKind,
        presence: Presence,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            number,
            name: name.into(),
            kind,
            presence,
        });
        self
    }

    /// Singular field with a has-bit (proto2 `optional`, proto3 `optional`,
    /// and every message-typed singular field).
    #[must_use]
    pub fn optional(self, number: u32, name: impl Into<String>, ty: ValueType) -> Self {
        self.field(number, name, FieldKind::Singular(ty), Presence::Explicit)
    }

    /// Singular field without a has-bit (proto3 plain scalar).
    #[must_use]
    pub fn implicit(self, number: u32, name: impl Into<String>, ty: ValueType) -> Self {
        self.field(number, name, FieldKind::Singular(ty), Presence::Implicit)
    }

    /// Repeated field. Scalar elements are packed.
    #[must_use]
    pub fn repeated(self, number: u32, name: impl Into<String>, element: ValueType) -> Self {
        let packed = matches!(element, ValueType::Scalar(_));
        self.field(
            number,
            name,
            FieldKind::Repeated { element, packed },
            Presence::Implicit,
        )
    }

    /// Map field.
    #[must_use]
    pub fn map(self, number: u32, name: impl Into<String>, key: ValueType, value: ValueType) -> Self {
        self.field(number, name, FieldKind::Map { key, value }, Presence::Implicit)
    }

    /// Singular member of oneof `oneof`.
    #[must_use]
    pub fn oneof(self, oneof: u16, number: u32, name: impl Into<String>, ty: ValueType) -> Self {
        self.field(number, name, FieldKind::Singular(ty), Presence::Oneof(oneof))
    }

    /// Validate and freeze the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for out-of-range or duplicate numbers,
    /// duplicate names, illegal presence, illegal map keys, or packed
    /// non-scalar elements.
    pub fn build(self) -> Result<Arc<MessageSchema>, SchemaError> {
        let Self {
            full_name,
            mut fields,
        } = self;

        let mut names = BTreeSet::new();
        for f in &fields {
            validate_field(&full_name, f)?;
            if !names.insert(f.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName {
                    schema: full_name.clone(),
                    name: f.name.clone(),
                });
            }
        }

        fields.sort_by_key(FieldDescriptor::number);
        for win in fields.windows(2) {
            if win[0].number == win[1].number {
                return Err(SchemaError::DuplicateFieldNumber {
                    schema: full_name,
                    number: win[0].number,
                });
            }
        }

        let shape = shape_digest(&full_name, &fields);
        Ok(Arc::new(MessageSchema {
            full_name,
            fields,
            shape,
        }))
    }
}

/// SHA-256 over a length-prefixed description of the schema. Nested schemas
/// contribute their own digest, so each schema is hashed exactly once.
fn shape_digest(full_name: &str, fields: &[FieldDescriptor]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    put_str(&mut hasher, full_name);
    hasher.update((fields.len() as u64).to_le_bytes());
    for f in fields {
        hasher.update(f.number.to_le_bytes());
        put_str(&mut hasher, &f.name);
        match f.presence {
            Presence::Implicit => hasher.update([0]),
            Presence::Explicit => hasher.update([1]),
            Presence::Oneof(index) => {
                hasher.update([2]);
                hasher.update(index.to_le_bytes());
            }
        }
        match &f.kind {
            FieldKind::Singular(ty) => {
                hasher.update([0]);
                put_type(&mut hasher, ty);
            }
            FieldKind::Repeated { element, packed } => {
                hasher.update([1, u8::from(*packed)]);
                put_type(&mut hasher, element);
            }
            FieldKind::Map { key, value } => {
                hasher.update([2]);
                put_type(&mut hasher, key);
                put_type(&mut hasher, value);
            }
        }
    }
    let mut shape = [0u8; 32];
    shape.copy_from_slice(&hasher.finalize());
    shape
}

fn put_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn put_type(hasher: &mut Sha256, ty: &ValueType) {
    match ty {
        ValueType::Scalar(kind) => {
            hasher.update([0]);
            put_str(hasher, &format!("{kind:?}"));
        }
        ValueType::String => hasher.update([1]),
        ValueType::Bytes => hasher.update([2]),
        ValueType::Message(schema) => {
            hasher.update([3]);
            hasher.update(schema.shape);
        }
    }
}

/// Checks shared by base fields and extensions.
pub(crate) fn validate_field(schema: &str, f: &FieldDescriptor) -> Result<(), SchemaError> {
    if f.number == 0 || f.number > MAX_FIELD_NUMBER || RESERVED_FIELD_NUMBERS.contains(&f.number) {
        return Err(SchemaError::InvalidFieldNumber {
            schema: schema.into(),
            number: f.number,
        });
    }

    let presence_error = |detail: &str| SchemaError::InvalidPresence {
        schema: schema.into(),
        field: f.name.clone(),
        detail: detail.into(),
    };

    match &f.kind {
        FieldKind::Singular(ValueType::Message(_)) => {
            if f.presence == Presence::Implicit {
                return Err(presence_error("message fields always track presence"));
            }
        }
        FieldKind::Singular(_) => {}
        FieldKind::Repeated { element, packed } => {
            if f.presence != Presence::Implicit {
                return Err(presence_error("repeated fields cannot track presence"));
            }
            if *packed && !matches!(element, ValueType::Scalar(_)) {
                return Err(SchemaError::InvalidPacked {
                    schema: schema.into(),
                    field: f.name.clone(),
                });
            }
        }
        FieldKind::Map { key, .. } => {
            if f.presence != Presence::Implicit {
                return Err(presence_error("map fields cannot track presence"));
            }
            let key_ok = match key {
                ValueType::Scalar(kind) => kind.is_valid_map_key(),
                ValueType::String => true,
                ValueType::Bytes | ValueType::Message(_) => false,
            };
            if !key_ok {
                return Err(SchemaError::InvalidMapKey {
                    schema: schema.into(),
                    field: f.name.clone(),
                    key: key.describe(),
                });
            }
        }
    }
    Ok(())
}

/// Convenience constructor for scalar value types.
#[must_use]
pub const fn scalar(kind: ScalarKind) -> ValueType {
    ValueType::Scalar(kind)
}
