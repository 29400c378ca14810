//! Offline story narration through an external speech program.
//!
//! The [`Narrator`] trait is the seam the session talks to: it takes rendered
//! story text and answers `true`/`false`, never an error. [`Narration`] is the
//! production implementation; it wraps an optional [`SpeechEngine`] that is
//! detected once at startup. A missing engine is a normal outcome, not a
//! failure of the program.
//!
//! Headless mode (CI, scripted runs) is an explicit setting: the CLI resolves
//! it once and passes it in, so narration never consults the environment.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::config::NarrationConfig;
use crate::io::process::run_with_input;

/// espeak amplitude corresponding to a volume of 1.0.
const MAX_AMPLITUDE: f32 = 200.0;

/// Runtime narration settings, resolved from config plus the headless flag.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationSettings {
    /// Pretend success without producing audio.
    pub headless: bool,
    pub rate: Option<u32>,
    pub volume: Option<f32>,
    pub timeout: Duration,
}

impl NarrationSettings {
    pub fn from_config(cfg: &NarrationConfig, headless: bool) -> Self {
        Self {
            headless,
            rate: cfg.rate,
            volume: cfg.volume,
            timeout: cfg.timeout(),
        }
    }
}

/// Abstraction over speech backends.
pub trait SpeechEngine {
    /// Speak `text` to completion (or until the settings' timeout).
    fn say(&self, text: &str, settings: &NarrationSettings) -> Result<()>;
}

/// Speech engine backed by an espeak-compatible program reading stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    /// Resolve `command[0]` on `PATH`. Returns `None` if it cannot be found.
    pub fn detect(command: &[String]) -> Option<Self> {
        let (name, args) = command.split_first()?;
        let program = resolve_program(name.trim())?;
        debug!(program = %program.display(), "speech engine detected");
        Some(Self {
            program,
            args: args.to_vec(),
        })
    }

    fn command(&self, settings: &NarrationSettings) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(rate) = settings.rate {
            cmd.arg("-s").arg(rate.to_string());
        }
        if let Some(volume) = settings.volume {
            let amplitude = (volume.clamp(0.0, 1.0) * MAX_AMPLITUDE).round() as u32;
            cmd.arg("-a").arg(amplitude.to_string());
        }
        cmd
    }
}

impl SpeechEngine for CommandEngine {
    #[instrument(skip_all, fields(program = %self.program.display()))]
    fn say(&self, text: &str, settings: &NarrationSettings) -> Result<()> {
        let outcome = run_with_input(self.command(settings), text.as_bytes(), settings.timeout)?;
        if outcome.timed_out {
            return Err(anyhow!(
                "narration timed out after {}s",
                settings.timeout.as_secs()
            ));
        }
        if !outcome.succeeded() {
            return Err(anyhow!(
                "speech program exited with {:?}: {}",
                outcome.status.code(),
                outcome.stderr_excerpt()
            ));
        }
        Ok(())
    }
}

/// Speak `text`, reporting success as a plain boolean.
///
/// - blank text: `false`, the engine is not touched
/// - headless: `true`, the engine is not touched
/// - no engine: `false`
/// - engine error: `false` (logged)
pub fn speak_text<E: SpeechEngine>(
    engine: Option<&E>,
    settings: &NarrationSettings,
    text: &str,
) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if settings.headless {
        debug!(chars = text.len(), "headless, skipping narration");
        return true;
    }
    let Some(engine) = engine else {
        return false;
    };
    match engine.say(text, settings) {
        Ok(()) => true,
        Err(err) => {
            warn!(err = %format!("{err:#}"), "narration failed");
            false
        }
    }
}

/// What the session uses to read a story aloud.
pub trait Narrator {
    /// Returns `true` when the story was spoken (or skipped in headless mode).
    fn speak(&self, text: &str) -> bool;
}

/// Production narrator: a detected engine (if any) plus settings.
#[derive(Debug, Clone)]
pub struct Narration<E> {
    engine: Option<E>,
    settings: NarrationSettings,
}

impl<E: SpeechEngine> Narration<E> {
    pub fn new(engine: Option<E>, settings: NarrationSettings) -> Self {
        Self { engine, settings }
    }

    pub fn is_available(&self) -> bool {
        self.settings.headless || self.engine.is_some()
    }
}

impl Narration<CommandEngine> {
    /// Detect the configured speech program and build a narrator around it.
    pub fn from_config(cfg: &NarrationConfig, headless: bool) -> Self {
        let engine = if headless {
            None
        } else {
            CommandEngine::detect(&cfg.command)
        };
        if engine.is_none() && !headless {
            info!(command = ?cfg.command, "speech program not found, narration unavailable");
        }
        Self::new(engine, NarrationSettings::from_config(cfg, headless))
    }
}

impl<E: SpeechEngine> Narrator for Narration<E> {
    fn speak(&self, text: &str) -> bool {
        speak_text(self.engine.as_ref(), &self.settings, text)
    }
}

/// True for `1`, `true`, `yes` (any case, surrounding whitespace ignored).
pub fn is_truthy_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn resolve_program(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let search = env::var_os("PATH")?;
    env::split_paths(&search)
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}
