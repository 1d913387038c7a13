//! Wire module: canonical encoder, unknown-field comparer, scratch arena.
//!
//! Depends on `schema` and `message`. Tag, varint and wire-type handling come
//! from [`prost::encoding`]; this module only adds message-level logic on top.
//!
//! # Wire format
//!
//! Every field is `tag || payload` where `tag = varint(number << 3 | wire_type)`.
//!
//! | Wire type | Payload |
//! |-----------|---------|
//! | 0 varint  | LEB128, 1..=10 bytes |
//! | 1 fixed64 | 8 bytes little-endian |
//! | 2 delimited | `varint(len) || len bytes` |
//! | 3 start group | fields until the matching end group |
//! | 4 end group | none |
//! | 5 fixed32 | 4 bytes little-endian |

pub mod arena;
pub mod encode;
pub mod unknown;

pub use prost::encoding::WireType;
