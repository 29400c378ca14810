//! Prompt source: a JSON array of strings, or the built-in set.
//!
//! Loading never fails. Anything wrong with the file is logged and the
//! built-in prompts are returned, so the core always receives a non-empty list.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

/// Prompts used when no file is configured or the file is unusable.
pub const DEFAULT_PROMPTS: [&str; 3] = [
    "It was a rainy afternoon when the package finally arrived at the door...",
    "Under the old sycamore tree, a tiny glowing key hummed softly in the dirt...",
    "Everyone in the village knew not to ring the bell at midnight\u{2014}until tonight.",
];

pub fn default_prompts() -> Vec<String> {
    DEFAULT_PROMPTS.iter().map(|prompt| prompt.to_string()).collect()
}

/// Load prompts from `path`, falling back to [`DEFAULT_PROMPTS`].
pub fn load_prompts(path: Option<&Path>) -> Vec<String> {
    let Some(path) = path else {
        debug!("no prompt file configured, using built-in prompts");
        return default_prompts();
    };
    match read_prompt_file(path) {
        Ok(prompts) => {
            debug!(path = %path.display(), count = prompts.len(), "prompts loaded");
            prompts
        }
        Err(err) => {
            warn!(path = %path.display(), err = %format!("{err:#}"), "falling back to built-in prompts");
            default_prompts()
        }
    }
}

/// Strict variant of [`load_prompts`]: reports why a file cannot be used.
pub fn read_prompt_file(path: &Path) -> Result<Vec<String>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read prompts {}", path.display()))?;
    let raw: Vec<String> = serde_json::from_str(&contents)
        .with_context(|| format!("parse prompts {}", path.display()))?;
    let prompts: Vec<String> = raw
        .into_iter()
        .filter(|prompt| !prompt.trim().is_empty())
        .collect();
    if prompts.is_empty() {
        return Err(anyhow!("no usable prompts in {}", path.display()));
    }
    Ok(prompts)
}
