//! Extension descriptors.
//!
//! An extension is a field declared outside its extendee's schema. Its
//! identity is the `Arc` allocation returned by [`ExtensionDescriptor::new`]:
//! two descriptors with identical contents are still different extensions.
//! Messages look extensions up by that identity, never by position.

use std::sync::Arc;

use crate::schema::descriptor::{validate_field, SchemaError};
use crate::schema::field::{FieldDescriptor, FieldKind, Presence};

/// A registered extension of one message type.
#[derive(Debug)]
pub struct ExtensionDescriptor {
    extendee: String,
    field: FieldDescriptor,
}

impl ExtensionDescriptor {
    /// Declare an extension of `extendee` (a message full name).
    ///
    /// Singular extensions track presence; repeated extensions do not.
    /// Map-typed extensions are accepted for completeness even though the
    /// schema language does not produce them.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] under the same rules as base fields.
    pub fn new(
        extendee: impl Into<String>,
        number: u32,
        name: impl Into<String>,
        kind: FieldKind,
    ) -> Result<Arc<Self>, SchemaError> {
        let extendee = extendee.into();
        let presence = match kind {
            FieldKind::Singular(_) => Presence::Explicit,
            FieldKind::Repeated { .. } | FieldKind::Map { .. } => Presence::Implicit,
        };
        let field = FieldDescriptor {
            number,
            name: name.into(),
            kind,
            presence,
        };
        validate_field(&extendee, &field)?;
        Ok(Arc::new(Self { extendee, field }))
    }

    /// Full name of the extended message type.
    #[must_use]
    pub fn extendee(&self) -> &str {
        &self.extendee
    }

    /// The field half of the extension.
    #[must_use]
    pub const fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    /// Shorthand for `field().number()`.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.field.number
    }
}
