//! Shared fixtures for the lock tests and fixture binaries.

pub mod fixtures;
