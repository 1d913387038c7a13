//! msgcmp compare: structural and exact equality for schema-driven messages.
//!
//! Builds on `msgcmp_kernel` (schema model, message storage, wire encoder).
//!
//! # Crate dependency graph
//!
//! ```text
//! msgcmp_kernel  ←  msgcmp_compare  ←  lock-tests, benchmarks
//! (schema, wire)    (engines, policy)
//! ```
//!
//! # Two notions of equality
//!
//! - [`is_equal`] -- same logical value. Map entries and extensions may be
//!   stored in any order; unknown-field trailers must match semantically.
//! - [`is_exactly_equal`] -- same canonical encoding (unknown fields
//!   skipped, deterministic order).
//!
//! The free functions use [`ComparePolicyV1::default`]. Use [`Comparator`]
//! for a custom policy, three-way outcomes, or fingerprints.

#![forbid(unsafe_code)]

mod canonical;
pub mod comparator;
mod container;
pub mod error;
pub mod outcome;
pub mod policy;
mod structural;

use std::sync::Arc;

use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::schema::descriptor::MessageSchema;

pub use comparator::Comparator;
pub use error::{CompareError, PolicyError};
pub use msgcmp_kernel::message::iter::{
    is_empty, next_base_field, next_extension, ExtensionCursor, FieldCursor,
};
pub use outcome::CompareOutcome;
pub use policy::ComparePolicyV1;

/// Structural equality under the default policy.
#[must_use]
pub fn is_equal(m1: &Message, m2: &Message, schema: &Arc<MessageSchema>) -> bool {
    Comparator::default().is_equal(m1, m2, schema)
}

/// Exact equality under the default policy.
#[must_use]
pub fn is_exactly_equal(m1: &Message, m2: &Message, schema: &Arc<MessageSchema>) -> bool {
    Comparator::default().is_exactly_equal(m1, m2, schema)
}
