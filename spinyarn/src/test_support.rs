//! Test-only helpers for building stories and observing narration.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::story::StoryState;
use crate::io::narration::Narrator;

/// Create a story over the given prompts and roster.
///
/// # Panics
///
/// Panics if `prompts` is empty.
pub fn story_with(prompts: &[&str], players: &[&str]) -> StoryState {
    let prompts = prompts.iter().map(|prompt| prompt.to_string()).collect();
    StoryState::with_players(prompts, players).expect("test story needs at least one prompt")
}

/// Narrator that records every text it is asked to speak and answers with a
/// fixed result.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    result: bool,
    spoken: RefCell<Vec<String>>,
}

impl RecordingNarrator {
    pub fn new(result: bool) -> Self {
        Self {
            result,
            spoken: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of everything passed to [`Narrator::speak`], in call order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.borrow().clone()
    }
}

impl Narrator for RecordingNarrator {
    fn speak(&self, text: &str) -> bool {
        self.spoken.borrow_mut().push(text.to_string());
        self.result
    }
}

/// Temporary working directory for CLI tests.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a prompt list as JSON and return its path.
    pub fn write_prompts(&self, prompts: &[&str]) -> Result<PathBuf> {
        let path = self.path().join("prompts.json");
        let json = serde_json::to_string_pretty(prompts).context("serialize prompts")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write a file relative to the directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
