//! Line-oriented terminal session for `spinyarn play`.
//!
//! The session is the presentation layer: it reads one command per input
//! line, applies it to the [`StoryState`], and writes a human-readable
//! response. Core errors are shown to the user and never end the session.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::error::StoryError;
use crate::core::roster::parse_roster;
use crate::core::story::StoryState;
use crate::io::narration::Narrator;
use crate::io::story_file::save_story;

const HELP: &str = "\
Type a line to add it to the story (start with // to add a line beginning with /).
Commands:
  /prompts              list starter prompts
  /prompt <n>           switch to prompt n (clears the story)
  /players <a, b, ...>  replace the roster (rotation restarts)
  /turns <n|none>       set or clear the turn limit
  /undo                 remove the last line
  /show                 print the story so far
  /history              print the add/undo log
  /read                 read the story aloud
  /save [path]          save the story as plain text
  /clear                clear the story
  /help                 show this help
  /quit                 end the session";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Story text for the current player.
    Line(String),
    Prompts,
    /// 1-based prompt number.
    Prompt(usize),
    Players(String),
    Turns(Option<u32>),
    Undo,
    Show,
    History,
    Read,
    Save(Option<PathBuf>),
    Clear,
    Help,
    Quit,
    /// Input that looked like a command but could not be used.
    Invalid(String),
}

/// Whether the session should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(input: &str) -> Option<SessionCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(escaped) = trimmed.strip_prefix("//") {
        return Some(SessionCommand::Line(format!("/{escaped}")));
    }
    let Some(body) = trimmed.strip_prefix('/') else {
        return Some(SessionCommand::Line(trimmed.to_string()));
    };

    let (name, arg) = match body.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (body, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "prompts" => SessionCommand::Prompts,
        "prompt" => match arg.parse::<usize>() {
            Ok(0) | Err(_) => SessionCommand::Invalid(format!(
                "'/prompt' needs a prompt number starting at 1 (got '{arg}')"
            )),
            Ok(number) => SessionCommand::Prompt(number),
        },
        "players" => SessionCommand::Players(arg.to_string()),
        "turns" => parse_turns(arg),
        "undo" => SessionCommand::Undo,
        "show" => SessionCommand::Show,
        "history" => SessionCommand::History,
        "read" => SessionCommand::Read,
        "save" if arg.is_empty() => SessionCommand::Save(None),
        "save" => SessionCommand::Save(Some(PathBuf::from(arg))),
        "clear" => SessionCommand::Clear,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        _ => SessionCommand::Invalid(format!("unknown command '/{name}' (try /help)")),
    };
    Some(command)
}

fn parse_turns(arg: &str) -> SessionCommand {
    match arg.to_ascii_lowercase().as_str() {
        "" | "none" | "off" | "unlimited" => SessionCommand::Turns(None),
        value => match value.parse::<u32>() {
            Ok(limit) => SessionCommand::Turns(Some(limit)),
            Err(_) => SessionCommand::Invalid(format!(
                "turn limit must be a whole number or 'none' (got '{arg}')"
            )),
        },
    }
}

/// A running story session bound to a narrator and a default save path.
pub struct Session<N> {
    story: StoryState,
    narrator: N,
    save_path: PathBuf,
}

impl<N: Narrator> Session<N> {
    pub fn new(story: StoryState, narrator: N, save_path: PathBuf) -> Self {
        Self {
            story,
            narrator,
            save_path,
        }
    }

    pub fn story(&self) -> &StoryState {
        &self.story
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    /// Drive the session until `/quit` or end of input, then print the story.
    ///
    /// Input lines that are not valid UTF-8 are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        writeln!(out, "Spin a Yarn")?;
        writeln!(out, "Prompt: {}", self.story.selected_prompt())?;
        writeln!(out, "Players: {}", self.story.players().join(", "))?;
        writeln!(out, "Type /help for commands.")?;
        self.write_banner(out)?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).context("read input")? == 0 {
                break;
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(bytes = buf.len(), "skipping input line that is not UTF-8");
                writeln!(out, "error: input line is not valid UTF-8; skipped")?;
                self.write_banner(out)?;
                continue;
            };
            let Some(command) = parse_command(line) else {
                continue;
            };
            if self.execute(command, out)? == Flow::Quit {
                break;
            }
            self.write_banner(out)?;
        }

        writeln!(out)?;
        writeln!(out, "Final story:")?;
        write!(out, "{}", self.story.build_story())?;
        out.flush().context("flush output")?;
        info!(lines = self.story.lines().len(), "session ended");
        Ok(())
    }

    /// Apply one command. Only write failures are returned as errors.
    pub fn execute<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<Flow> {
        debug!(?command, "executing");
        match command {
            SessionCommand::Line(text) => {
                let player = self.story.current_player().to_string();
                match self.story.add_line(&text) {
                    Ok(()) => debug!(%player, "line accepted"),
                    Err(err) => self.write_error(out, &err)?,
                }
            }
            SessionCommand::Prompts => {
                for (index, prompt) in self.story.prompts().iter().enumerate() {
                    let marker = if index == self.story.selected_prompt_index() {
                        '*'
                    } else {
                        ' '
                    };
                    writeln!(out, "{marker} {}. {prompt}", index + 1)?;
                }
            }
            SessionCommand::Prompt(number) => match self.story.select_prompt(number - 1) {
                Ok(()) => writeln!(out, "Prompt: {}", self.story.selected_prompt())?,
                Err(err) => self.write_error(out, &err)?,
            },
            SessionCommand::Players(raw) => {
                self.story.set_players(parse_roster(&raw));
                writeln!(out, "Players: {}", self.story.players().join(", "))?;
            }
            SessionCommand::Turns(limit) => match self.story.set_max_turns(limit) {
                Ok(()) => match self.story.max_turns() {
                    Some(limit) => writeln!(out, "Max turns: {limit}")?,
                    None => writeln!(out, "Max turns: unlimited")?,
                },
                Err(err) => self.write_error(out, &err)?,
            },
            SessionCommand::Undo => {
                if !self.story.undo() {
                    writeln!(out, "Nothing to undo.")?;
                }
            }
            SessionCommand::Show => write!(out, "{}", self.story.build_story())?,
            SessionCommand::History => {
                if self.story.history().is_empty() {
                    writeln!(out, "(no history)")?;
                }
                for (index, entry) in self.story.history().iter().enumerate() {
                    writeln!(out, "{}. {entry}", index + 1)?;
                }
            }
            SessionCommand::Read => {
                if !self.narrator.speak(&self.story.build_story()) {
                    writeln!(out, "warning: narration is not available on this system.")?;
                }
            }
            SessionCommand::Save(path) => {
                let target = path.unwrap_or_else(|| self.save_path.clone());
                match save_story(&target, &self.story.build_story()) {
                    Ok(written) => writeln!(out, "Saved to: {}", written.display())?,
                    Err(err) => writeln!(out, "error: failed to save file: {err:#}")?,
                }
            }
            SessionCommand::Clear => {
                self.story.reset_story();
                writeln!(out, "Story cleared.")?;
            }
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Quit),
            SessionCommand::Invalid(message) => writeln!(out, "error: {message}")?,
        }
        Ok(Flow::Continue)
    }

    fn write_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(
            out,
            "Turn {} \u{2014} {}",
            self.story.turn_number(),
            self.story.current_player()
        )?;
        if !self.story.can_add_line() {
            write!(out, " (turn limit reached)")?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_error<W: Write>(&self, out: &mut W, err: &StoryError) -> Result<()> {
        match err {
            StoryError::OutOfRange { len, .. } => {
                writeln!(out, "error: no such prompt; choose 1-{len}")?;
            }
            other => writeln!(out, "error: {other}")?,
        }
        Ok(())
    }
}
