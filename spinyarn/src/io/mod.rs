//! I/O collaborators around the story core: config, prompts, export, narration.

pub mod config;
pub mod narration;
pub mod process;
pub mod prompts;
pub mod story_file;
