//! msgcmp kernel: schema model, message storage, and wire primitives for
//! protobuf-style message comparison.
//!
//! # API Surface
//!
//! - [`schema`] -- message and extension descriptors, built with
//!   [`schema::descriptor::SchemaBuilder`]
//! - [`message`] -- runtime messages and the field iteration protocol
//!   ([`message::iter::next_base_field`], [`message::iter::next_extension`])
//! - [`wire::encode::encode`] -- canonical encoder
//! - [`wire::unknown::unknown_fields_equal`] -- unknown-trailer comparer
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256
//!
//! # Module Dependency Direction
//!
//! `schema` ← `message` ← `wire`, and `proof` standalone.
//!
//! `schema` borrows only the [`wire::WireType`] vocabulary from `wire`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod message;
pub mod proof;
pub mod schema;
pub mod wire;
