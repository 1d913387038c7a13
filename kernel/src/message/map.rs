//! `Map`: storage for map fields.
//!
//! Entries are kept in insertion order with a hash index for point lookup.
//! Callers must not rely on that order: two maps with the same entries
//! inserted in different orders are the same logical value, and the
//! canonical encoder sorts entries by key.

use std::collections::HashMap;

use crate::message::value::{MapKey, MessageValue, Value};
use crate::message::MessageError;
use crate::schema::field::ValueType;

/// Set of key/value entries with unique keys.
#[derive(Debug, Clone)]
pub struct Map {
    key_type: ValueType,
    value_type: ValueType,
    entries: Vec<(MapKey, Value)>,
    index: HashMap<MapKey, usize>,
}

impl Map {
    #[must_use]
    pub fn new(key_type: ValueType, value_type: ValueType) -> Self {
        Self {
            key_type,
            value_type,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn key_type(&self) -> &ValueType {
        &self.key_type
    }

    #[must_use]
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the value for `key`. Returns the previous value.
    ///
    /// # Errors
    ///
    /// [`MessageError::KeyMismatch`] if the key does not fit the key type,
    /// or a value type error as for [`Value::check`].
    pub fn insert(
        &mut self,
        key: impl Into<MapKey>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, MessageError> {
        let key = key.into();
        if !key.fits(&self.key_type) {
            return Err(MessageError::KeyMismatch {
                expected: self.key_type.describe(),
                found: format!("{key:?}"),
            });
        }
        let value = value.into();
        value.check(&self.value_type)?;

        if let Some(&i) = self.index.get(&key) {
            return Ok(Some(std::mem::replace(&mut self.entries[i].1, value)));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        Ok(None)
    }

    /// Point lookup by key.
    #[must_use]
    pub fn get(&self, key: &MapKey) -> Option<MessageValue<'_>> {
        self.index.get(key).map(|&i| self.entries[i].1.view())
    }

    #[must_use]
    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.index.contains_key(key)
    }

    /// Remove the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &MapKey) -> Option<Value> {
        let i = self.index.remove(key)?;
        let (_, value) = self.entries.swap_remove(i);
        if let Some((moved, _)) = self.entries.get(i) {
            self.index.insert(moved.clone(), i);
        }
        Some(value)
    }

    /// Full scan in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, MessageValue<'_>)> {
        self.entries.iter().map(|(k, v)| (k, v.view()))
    }

    /// Remove all entries. The map stays materialized (size 0).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
