//! Plain-text story export.
//!
//! A saved story is exactly the rendered story text: prompt, blank line, one
//! line per contribution, single trailing newline. There is no header and no
//! way to load it back into a session.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

/// File name offered when the user does not pick one.
pub const DEFAULT_STORY_FILE: &str = "spin-a-yarn.txt";

/// Write `story` to `path`, appending `.txt` when the path has no extension
/// (a trailing bare `.` counts as none).
///
/// Parent directories are created as needed. Returns the path actually written.
pub fn save_story(path: &Path, story: &str) -> Result<PathBuf> {
    let path = with_default_extension(path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("txt.tmp");
    debug!(path = %path.display(), bytes = story.len(), "writing story");
    fs::write(&tmp_path, story)
        .with_context(|| format!("write temp story {}", tmp_path.display()))?;
    fs::rename(&tmp_path, &path).with_context(|| format!("replace story {}", path.display()))?;
    info!(path = %path.display(), "story saved");
    Ok(path)
}

/// Read a previously saved story.
pub fn read_story(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read story {}", path.display()))
}

fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| !ext.is_empty()) {
        return path.to_path_buf();
    }
    path.with_extension("txt")
}
