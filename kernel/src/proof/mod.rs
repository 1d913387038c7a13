//! Proof module: canonical hashing of encoded messages.
//!
//! Depends on nothing internal. `compare` uses it to fingerprint canonical
//! encodings.

pub mod hash;
