//! Collaborative turn-based storytelling.
//!
//! Players take turns adding lines to a story that starts from a shared
//! prompt. The crate keeps a strict separation:
//!
//! - **[`core`]**: the story state machine (turn rotation, line limits, undo).
//!   No I/O, fully deterministic.
//! - **[`io`]**: collaborators with side effects (config, prompt files, story
//!   export, speech narration).
//!
//! [`session`] ties the two together as a line-oriented terminal front end.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
