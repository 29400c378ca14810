//! Error taxonomy for story state transitions.

use thiserror::Error;

/// Errors returned by [`StoryState`](crate::core::story::StoryState) operations.
///
/// Every variant is recoverable: the operation that produced it left the
/// state untouched, so callers can report the message and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// Input rejected outright (empty line, zero turn limit, no prompts).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Prompt index outside `[0, len)`.
    #[error("prompt index {index} out of range (have {len} prompts)")]
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of prompts available.
        len: usize,
    },

    /// The turn cap has been hit; no further lines are accepted.
    #[error("maximum number of turns reached ({max_turns})")]
    LimitReached {
        /// The active turn limit.
        max_turns: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            StoryError::InvalidArgument("cannot add empty line".to_string()).to_string(),
            "invalid argument: cannot add empty line"
        );
        assert_eq!(
            StoryError::OutOfRange { index: 5, len: 2 }.to_string(),
            "prompt index 5 out of range (have 2 prompts)"
        );
        assert!(
            StoryError::LimitReached { max_turns: 3 }
                .to_string()
                .contains("maximum number of turns reached")
        );
    }
}
