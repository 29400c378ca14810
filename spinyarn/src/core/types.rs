//! Shared deterministic types for story core logic.
//!
//! These types define stable contracts between the core and its callers.
//! They carry no I/O and render identically across runs.

use std::fmt;

/// One entry in the story's append-only audit trail.
///
/// History is distinct from the visible story body: undoing a line removes it
/// from the body but records a new `Undid` entry here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A line was appended to the story.
    Added(String),
    /// The most recent line was removed.
    Undid(String),
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryEntry::Added(text) => write!(f, "added line {text}"),
            HistoryEntry::Undid(text) => write!(f, "undid line {text}"),
        }
    }
}
