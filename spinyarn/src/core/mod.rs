//! Deterministic, pure logic for the story state machine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod error;
pub mod invariants;
pub mod roster;
pub mod story;
pub mod types;
