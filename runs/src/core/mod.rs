//! Deterministic, pure logic for the run registry.
//!
//! Core modules must be free of I/O side effects. They operate on the
//! in-memory [`crate::tree::Tree`] and return [`crate::error::RegistryError`]
//! values suitable for tests.

pub mod command;
pub mod flags;
pub mod invariants;
pub mod mutation;
pub mod path;
pub mod pattern;
pub mod query;
pub mod types;
