//! `Message`: one slot per base field, a sparse extension list, and an
//! opaque unknown-field trailer.
//!
//! # Ownership
//!
//! A message shares its schema (`Arc`) and exclusively owns everything else:
//! slot values, container handles, submessages, extension values and trailer
//! bytes.
//!
//! # Presence
//!
//! Slots of tracked fields (explicit or oneof) carry a has-bit. Slots of
//! implicit fields always hold a value; the zero value reads as "unset".
//! Container and submessage handles stay `None` until first materialized.

use std::sync::Arc;

use crate::message::array::Array;
use crate::message::map::Map;
use crate::message::value::{MapKey, MessageValue, ScalarValue, Value};
use crate::message::MessageError;
use crate::schema::descriptor::MessageSchema;
use crate::schema::extension::ExtensionDescriptor;
use crate::schema::field::{FieldDescriptor, FieldKind, Presence, ValueType};

/// Stored contents of one slot or extension entry.
#[derive(Debug, Clone)]
pub(crate) enum SlotData {
    Scalar(ScalarValue),
    Bytes(Vec<u8>),
    Array(Option<Array>),
    Map(Option<Map>),
    Message(Option<Box<Message>>),
}

impl SlotData {
    fn empty_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Singular(ValueType::Scalar(k)) => Self::Scalar(ScalarValue::zero(*k)),
            FieldKind::Singular(ValueType::String | ValueType::Bytes) => Self::Bytes(Vec::new()),
            FieldKind::Singular(ValueType::Message(_)) => Self::Message(None),
            FieldKind::Repeated { .. } => Self::Array(None),
            FieldKind::Map { .. } => Self::Map(None),
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Scalar(v) => Self::Scalar(v),
            Value::Bytes(b) => Self::Bytes(b),
            Value::Message(m) => Self::Message(Some(m)),
        }
    }

    pub(crate) fn view(&self) -> MessageValue<'_> {
        match self {
            Self::Scalar(v) => MessageValue::Scalar(*v),
            Self::Bytes(b) => MessageValue::Bytes(b),
            Self::Array(a) => MessageValue::Array(a.as_ref()),
            Self::Map(m) => MessageValue::Map(m.as_ref()),
            Self::Message(m) => MessageValue::Message(m.as_deref()),
        }
    }

    /// The all-zero representation for the slot's kind: zero bits, empty
    /// payload, or an absent/empty container.
    pub(crate) fn is_zero(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_zero(),
            Self::Bytes(b) => b.is_empty(),
            Self::Array(a) => a.as_ref().map_or(true, Array::is_empty),
            Self::Map(m) => m.as_ref().map_or(true, Map::is_empty),
            Self::Message(m) => m.is_none(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) has: bool,
    pub(crate) data: SlotData,
}

#[derive(Debug, Clone)]
pub(crate) struct ExtensionEntry {
    pub(crate) ext: Arc<ExtensionDescriptor>,
    pub(crate) data: SlotData,
}

/// A runtime message instance of one schema.
#[derive(Debug, Clone)]
pub struct Message {
    schema: Arc<MessageSchema>,
    slots: Vec<Slot>,
    extensions: Vec<ExtensionEntry>,
    unknown: Vec<u8>,
}

impl Message {
    /// An empty message: every field unset, no extensions, no trailer.
    #[must_use]
    pub fn new(schema: &Arc<MessageSchema>) -> Self {
        let slots = schema
            .fields()
            .iter()
            .map(|f| Slot {
                has: false,
                data: SlotData::empty_for(f.kind()),
            })
            .collect();
        Self {
            schema: Arc::clone(schema),
            slots,
            extensions: Vec::new(),
            unknown: Vec::new(),
        }
    }

    /// The schema this message was created with.
    #[must_use]
    pub const fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub(crate) fn extension_entries(&self) -> &[ExtensionEntry] {
        &self.extensions
    }

    fn locate(&self, number: u32) -> Result<(usize, Arc<MessageSchema>), MessageError> {
        let index = self
            .schema
            .index_of(number)
            .ok_or_else(|| MessageError::NoSuchField {
                schema: self.schema.full_name().into(),
                number,
            })?;
        Ok((index, Arc::clone(&self.schema)))
    }

    fn clear_oneof_siblings(&mut self, schema: &MessageSchema, index: usize) {
        let Presence::Oneof(group) = schema.fields()[index].presence() else {
            return;
        };
        for (j, f) in schema.fields().iter().enumerate() {
            if j != index && f.presence() == Presence::Oneof(group) {
                self.slots[j] = Slot {
                    has: false,
                    data: SlotData::empty_for(f.kind()),
                };
            }
        }
    }

    /// Set a singular field. Setting a oneof member clears its siblings.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`], [`MessageError::WrongCardinality`] for
    /// repeated/map fields, or a type error from [`Value::check`].
    pub fn set(&mut self, number: u32, value: impl Into<Value>) -> Result<(), MessageError> {
        let (index, schema) = self.locate(number)?;
        let field = &schema.fields()[index];
        let FieldKind::Singular(ty) = field.kind() else {
            return Err(not_singular(field));
        };
        let value = value.into();
        value.check(ty)?;

        self.clear_oneof_siblings(&schema, index);
        self.slots[index] = Slot {
            has: field.presence().is_tracked(),
            data: SlotData::from_value(value),
        };
        Ok(())
    }

    /// Reset a field to unset/empty.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`].
    pub fn clear(&mut self, number: u32) -> Result<(), MessageError> {
        let (index, schema) = self.locate(number)?;
        self.slots[index] = Slot {
            has: false,
            data: SlotData::empty_for(schema.fields()[index].kind()),
        };
        Ok(())
    }

    /// Has-bit query. Implicit fields report whether they hold a non-zero
    /// value.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`].
    pub fn has(&self, number: u32) -> Result<bool, MessageError> {
        let (index, schema) = self.locate(number)?;
        let slot = &self.slots[index];
        Ok(if schema.fields()[index].presence().is_tracked() {
            slot.has
        } else {
            !slot.data.is_zero()
        })
    }

    /// Raw slot view, whether or not the field is set.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`].
    pub fn get(&self, number: u32) -> Result<MessageValue<'_>, MessageError> {
        let (index, _) = self.locate(number)?;
        Ok(self.slots[index].data.view())
    }

    /// Get-or-create a singular submessage, marking it present.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`] or [`MessageError::WrongCardinality`]
    /// when the field is not a singular message.
    pub fn message_mut(&mut self, number: u32) -> Result<&mut Self, MessageError> {
        let (index, schema) = self.locate(number)?;
        let field = &schema.fields()[index];
        let FieldKind::Singular(ValueType::Message(sub)) = field.kind() else {
            return Err(MessageError::WrongCardinality {
                field: field.name().into(),
                detail: "not a singular message field".into(),
            });
        };

        if !self.slots[index].has {
            self.clear_oneof_siblings(&schema, index);
        }
        let slot = &mut self.slots[index];
        match &mut slot.data {
            SlotData::Message(m) => {
                slot.has = true;
                Ok(m.get_or_insert_with(|| Box::new(Self::new(sub))).as_mut())
            }
            _ => Err(slot_kind_error(field, "message")),
        }
    }

    /// Get-or-create the array behind a repeated field.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`] or [`MessageError::WrongCardinality`].
    pub fn array_mut(&mut self, number: u32) -> Result<&mut Array, MessageError> {
        let (index, schema) = self.locate(number)?;
        let field = &schema.fields()[index];
        let FieldKind::Repeated { element, .. } = field.kind() else {
            return Err(MessageError::WrongCardinality {
                field: field.name().into(),
                detail: "not a repeated field".into(),
            });
        };
        materialize_array(&mut self.slots[index].data, field, element)
    }

    /// Append to a repeated field.
    ///
    /// # Errors
    ///
    /// As for [`array_mut`](Self::array_mut) and [`Array::push`].
    pub fn push(&mut self, number: u32, value: impl Into<Value>) -> Result<(), MessageError> {
        self.array_mut(number)?.push(value)
    }

    /// Get-or-create the map behind a map field.
    ///
    /// # Errors
    ///
    /// [`MessageError::NoSuchField`] or [`MessageError::WrongCardinality`].
    pub fn map_mut(&mut self, number: u32) -> Result<&mut Map, MessageError> {
        let (index, schema) = self.locate(number)?;
        let field = &schema.fields()[index];
        let FieldKind::Map { key, value } = field.kind() else {
            return Err(MessageError::WrongCardinality {
                field: field.name().into(),
                detail: "not a map field".into(),
            });
        };
        materialize_map(&mut self.slots[index].data, field, key, value)
    }

    /// Insert into a map field.
    ///
    /// # Errors
    ///
    /// As for [`map_mut`](Self::map_mut) and [`Map::insert`].
    pub fn map_insert(
        &mut self,
        number: u32,
        key: impl Into<MapKey>,
        value: impl Into<Value>,
    ) -> Result<(), MessageError> {
        self.map_mut(number)?.insert(key, value).map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Extensions
    // -----------------------------------------------------------------------

    fn extension_index(&self, ext: &Arc<ExtensionDescriptor>) -> Option<usize> {
        self.extensions
            .iter()
            .position(|e| Arc::ptr_eq(&e.ext, ext))
    }

    fn extension_entry_mut(
        &mut self,
        ext: &Arc<ExtensionDescriptor>,
    ) -> Result<&mut ExtensionEntry, MessageError> {
        if ext.extendee() != self.schema.full_name() {
            return Err(MessageError::ExtendeeMismatch {
                extension: ext.field().name().into(),
                extendee: ext.extendee().into(),
                schema: self.schema.full_name().into(),
            });
        }
        let index = if let Some(i) = self.extension_index(ext) {
            i
        } else {
            if self.extensions.iter().any(|e| e.ext.number() == ext.number()) {
                return Err(MessageError::ConflictingExtension {
                    schema: self.schema.full_name().into(),
                    number: ext.number(),
                });
            }
            self.extensions.push(ExtensionEntry {
                ext: Arc::clone(ext),
                data: SlotData::empty_for(ext.field().kind()),
            });
            self.extensions.len() - 1
        };
        Ok(&mut self.extensions[index])
    }

    /// Set a singular extension.
    ///
    /// # Errors
    ///
    /// [`MessageError::ExtendeeMismatch`], [`MessageError::ConflictingExtension`],
    /// [`MessageError::WrongCardinality`], or a type error.
    pub fn set_extension(
        &mut self,
        ext: &Arc<ExtensionDescriptor>,
        value: impl Into<Value>,
    ) -> Result<(), MessageError> {
        let FieldKind::Singular(ty) = ext.field().kind() else {
            return Err(not_singular(ext.field()));
        };
        let value = value.into();
        value.check(ty)?;
        self.extension_entry_mut(ext)?.data = SlotData::from_value(value);
        Ok(())
    }

    /// Get-or-create the array behind a repeated extension.
    ///
    /// # Errors
    ///
    /// As for [`set_extension`](Self::set_extension).
    pub fn extension_array_mut(
        &mut self,
        ext: &Arc<ExtensionDescriptor>,
    ) -> Result<&mut Array, MessageError> {
        let FieldKind::Repeated { element, .. } = ext.field().kind() else {
            return Err(MessageError::WrongCardinality {
                field: ext.field().name().into(),
                detail: "not a repeated extension".into(),
            });
        };
        let entry = self.extension_entry_mut(ext)?;
        materialize_array(&mut entry.data, ext.field(), element)
    }

    /// Get-or-create the map behind a map-typed extension.
    ///
    /// # Errors
    ///
    /// As for [`set_extension`](Self::set_extension).
    pub fn extension_map_mut(
        &mut self,
        ext: &Arc<ExtensionDescriptor>,
    ) -> Result<&mut Map, MessageError> {
        let FieldKind::Map { key, value } = ext.field().kind() else {
            return Err(MessageError::WrongCardinality {
                field: ext.field().name().into(),
                detail: "not a map extension".into(),
            });
        };
        let entry = self.extension_entry_mut(ext)?;
        materialize_map(&mut entry.data, ext.field(), key, value)
    }

    /// Look up an extension by identity.
    #[must_use]
    pub fn extension(&self, ext: &Arc<ExtensionDescriptor>) -> Option<MessageValue<'_>> {
        self.extension_index(ext)
            .map(|i| self.extensions[i].data.view())
    }

    #[must_use]
    pub fn has_extension(&self, ext: &Arc<ExtensionDescriptor>) -> bool {
        self.extension_index(ext).is_some()
    }

    /// Number of stored extension entries.
    #[must_use]
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Remove an extension. Returns whether it was present.
    pub fn clear_extension(&mut self, ext: &Arc<ExtensionDescriptor>) -> bool {
        match self.extension_index(ext) {
            Some(i) => {
                self.extensions.remove(i);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Unknown fields
    // -----------------------------------------------------------------------

    /// Unknown-field trailer bytes.
    #[must_use]
    pub fn unknown(&self) -> &[u8] {
        &self.unknown
    }

    /// Append raw wire bytes to the trailer. The bytes are not validated.
    pub fn add_unknown(&mut self, bytes: &[u8]) {
        self.unknown.extend_from_slice(bytes);
    }

    pub fn discard_unknown(&mut self) {
        self.unknown.clear();
    }
}

fn not_singular(field: &FieldDescriptor) -> MessageError {
    MessageError::WrongCardinality {
        field: field.name().into(),
        detail: "not a singular field".into(),
    }
}

/// Slots are created by `SlotData::empty_for` from the field kind and only
/// singular values are ever written over them, so a mismatch here means the
/// slot and its descriptor disagree.
fn slot_kind_error(field: &FieldDescriptor, expected: &str) -> MessageError {
    MessageError::WrongCardinality {
        field: field.name().into(),
        detail: format!("slot does not hold a {expected}"),
    }
}

fn materialize_array<'a>(
    data: &'a mut SlotData,
    field: &FieldDescriptor,
    element: &ValueType,
) -> Result<&'a mut Array, MessageError> {
    match data {
        SlotData::Array(a) => Ok(a.get_or_insert_with(|| Array::new(element.clone()))),
        _ => Err(slot_kind_error(field, "repeated field")),
    }
}

fn materialize_map<'a>(
    data: &'a mut SlotData,
    field: &FieldDescriptor,
    key: &ValueType,
    value: &ValueType,
) -> Result<&'a mut Map, MessageError> {
    match data {
        SlotData::Map(m) => Ok(m.get_or_insert_with(|| Map::new(key.clone(), value.clone()))),
        _ => Err(slot_kind_error(field, "map")),
    }
}
