//! Session configuration stored in `spinyarn.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::roster::{default_players, normalize_names};
use crate::io::story_file::DEFAULT_STORY_FILE;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "spinyarn.toml";

/// Session configuration (TOML).
///
/// Meant to be edited by hand. Missing fields fall back to the defaults a
/// fresh session would use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpinConfig {
    /// Initial roster, in turn order.
    pub players: Vec<String>,

    /// Optional cap on the number of lines in a story.
    pub max_turns: Option<u32>,

    /// JSON file holding the prompt list. Built-in prompts are used when unset.
    pub prompts_path: Option<PathBuf>,

    /// Where `/save` writes when no path is given.
    pub save_path: PathBuf,

    pub narration: NarrationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrationConfig {
    /// Speech program and leading arguments; the story is piped to stdin.
    pub command: Vec<String>,

    /// Words per minute, passed as `-s`.
    pub rate: Option<u32>,

    /// Loudness in `[0.0, 1.0]`, passed as `-a` scaled to espeak amplitude.
    pub volume: Option<f32>,

    /// Playback is killed after this many seconds.
    pub timeout_secs: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            command: vec!["espeak".to_string(), "--stdin".to_string()],
            rate: None,
            volume: None,
            timeout_secs: 5 * 60,
        }
    }
}

impl NarrationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            max_turns: None,
            prompts_path: None,
            save_path: PathBuf::from(DEFAULT_STORY_FILE),
            narration: NarrationConfig::default(),
        }
    }
}

impl SpinConfig {
    pub fn validate(&self) -> Result<()> {
        if normalize_names(&self.players).is_empty() {
            return Err(anyhow!("players must contain at least one non-empty name"));
        }
        if self.max_turns == Some(0) {
            return Err(anyhow!("max_turns must be > 0 when set"));
        }
        if self.save_path.as_os_str().is_empty() {
            return Err(anyhow!("save_path must not be empty"));
        }
        if self.narration.command.is_empty() || self.narration.command[0].trim().is_empty() {
            return Err(anyhow!("narration.command must be a non-empty array"));
        }
        if self.narration.timeout_secs == 0 {
            return Err(anyhow!("narration.timeout_secs must be > 0"));
        }
        if let Some(volume) = self.narration.volume
            && !(0.0..=1.0).contains(&volume)
        {
            return Err(anyhow!("narration.volume must be within 0.0..=1.0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SpinConfig::default()`.
pub fn load_config(path: &Path) -> Result<SpinConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = SpinConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SpinConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

/// Write config to disk, refusing to clobber an existing file unless `force`.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    write_config(path, &SpinConfig::default())
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SpinConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
