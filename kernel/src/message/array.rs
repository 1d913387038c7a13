//! `Array`: ordered, homogeneous storage for repeated fields.

use crate::message::storage::Message;
use crate::message::value::{MessageValue, Value};
use crate::message::MessageError;
use crate::schema::field::ValueType;

/// Ordered sequence of values of one declared element type.
///
/// Every element is checked against the element type on insert, so
/// readers may rely on homogeneity.
#[derive(Debug, Clone)]
pub struct Array {
    element: ValueType,
    items: Vec<Value>,
}

impl Array {
    #[must_use]
    pub const fn new(element: ValueType) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    /// Declared element type.
    #[must_use]
    pub const fn element_type(&self) -> &ValueType {
        &self.element
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<MessageValue<'_>> {
        self.items.get(index).map(Value::view)
    }

    /// Elements in order.
    pub fn iter(&self) -> impl Iterator<Item = MessageValue<'_>> {
        self.items.iter().map(Value::view)
    }

    /// Append one element.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::TypeMismatch`] or [`MessageError::InvalidUtf8`]
    /// if the value does not fit the element type.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), MessageError> {
        let value = value.into();
        value.check(&self.element)?;
        self.items.push(value);
        Ok(())
    }

    /// Replace the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::IndexOutOfBounds`] for a bad index, or a type
    /// error as for [`push`](Self::push).
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<(), MessageError> {
        let len = self.items.len();
        let value = value.into();
        value.check(&self.element)?;
        let slot = self
            .items
            .get_mut(index)
            .ok_or(MessageError::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Mutable access to a message element, for building nested data.
    #[must_use]
    pub fn message_mut(&mut self, index: usize) -> Option<&mut Message> {
        match self.items.get_mut(index) {
            Some(Value::Message(m)) => Some(m.as_mut()),
            _ => None,
        }
    }

    /// Remove all elements. The array stays materialized (size 0).
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
