//! Schema module: message schemas, field descriptors, extensions.
//!
//! This is the foundational layer. No other kernel module is imported here
//! except `wire` for the wire-type enum.

pub mod descriptor;
pub mod extension;
pub mod field;
