//! Spin a Yarn: a collaborative turn-based story in the terminal.
//!
//! `spinyarn play` starts a session where each input line is the next
//! player's contribution. Stories can be saved as plain text and read aloud
//! through an offline speech program.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use spinyarn::core::roster::parse_roster;
use spinyarn::core::story::StoryState;
use spinyarn::exit_codes;
use spinyarn::io::config::{DEFAULT_CONFIG_FILE, SpinConfig, init_config, load_config};
use spinyarn::io::narration::{Narration, Narrator, is_truthy_flag};
use spinyarn::io::prompts::load_prompts;
use spinyarn::io::story_file::read_story;
use spinyarn::logging;
use spinyarn::session::Session;

#[derive(Parser)]
#[command(
    name = "spinyarn",
    version,
    about = "Collaborative turn-based storytelling"
)]
struct Cli {
    /// Config file (defaults to ./spinyarn.toml; missing file means defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a story session, one line per turn, reading from stdin.
    Play(PlayArgs),
    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// List the starter prompts.
    Prompts {
        /// JSON file with prompts (overrides config).
        #[arg(long)]
        prompts: Option<PathBuf>,
    },
    /// Read a saved story file aloud.
    Read {
        /// Story file written by `/save`.
        file: PathBuf,

        /// Skip audio and report success (also enabled by CI=true).
        #[arg(long)]
        headless: bool,
    },
}

#[derive(Args, Debug, Default)]
struct PlayArgs {
    /// JSON file with prompts (overrides config).
    #[arg(long)]
    prompts: Option<PathBuf>,

    /// Comma-separated roster, e.g. "Ann, Bo".
    #[arg(long)]
    players: Option<String>,

    /// Stop accepting lines after this many turns.
    #[arg(long)]
    max_turns: Option<u32>,

    /// Starter prompt number (1-based).
    #[arg(long)]
    prompt: Option<usize>,

    /// Default file for `/save`.
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Skip audio and report success (also enabled by CI=true).
    #[arg(long)]
    headless: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match cli.command {
        Command::Play(args) => cmd_play(&config_path, args),
        Command::Init { force } => cmd_init(&config_path, force),
        Command::Prompts { prompts } => cmd_prompts(&config_path, prompts),
        Command::Read { file, headless } => cmd_read(&config_path, &file, headless),
    }
}

fn cmd_play(config_path: &Path, args: PlayArgs) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let story = build_story(&cfg, &args)?;
    let narrator = Narration::from_config(&cfg.narration, headless_mode(args.headless));
    let save_path = args.save_path.unwrap_or_else(|| cfg.save_path.clone());

    let mut session = Session::new(story, narrator, save_path);
    let stdin = io::stdin();
    let stdout = io::stdout();
    session
        .run(stdin.lock(), &mut stdout.lock())
        .context("story session")?;
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    init_config(config_path, force)?;
    println!("Wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_prompts(config_path: &Path, prompts: Option<PathBuf>) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let prompts_path = prompts.or(cfg.prompts_path);
    for (index, prompt) in load_prompts(prompts_path.as_deref()).iter().enumerate() {
        println!("{}. {prompt}", index + 1);
    }
    Ok(exit_codes::OK)
}

fn cmd_read(config_path: &Path, file: &Path, headless: bool) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let story = read_story(file)?;
    let narrator = Narration::from_config(&cfg.narration, headless_mode(headless));
    if !narrator.is_available() {
        eprintln!(
            "narration unavailable: speech program {:?} not found",
            cfg.narration.command
        );
        return Ok(exit_codes::NARRATION_UNAVAILABLE);
    }
    if narrator.speak(&story) {
        return Ok(exit_codes::OK);
    }
    eprintln!("narration failed: nothing to read or the speech program reported an error");
    Ok(exit_codes::NARRATION_UNAVAILABLE)
}

/// Assemble the starting story from config, with CLI flags taking precedence.
fn build_story(cfg: &SpinConfig, args: &PlayArgs) -> Result<StoryState> {
    let prompts_path = args.prompts.as_deref().or(cfg.prompts_path.as_deref());
    let prompts = load_prompts(prompts_path);
    let players = match &args.players {
        Some(raw) => parse_roster(raw),
        None => cfg.players.clone(),
    };

    let mut story = StoryState::with_players(prompts, players)?;
    story
        .set_max_turns(args.max_turns.or(cfg.max_turns))
        .context("--max-turns")?;
    if let Some(number) = args.prompt {
        let index = number
            .checked_sub(1)
            .ok_or_else(|| anyhow!("--prompt numbers start at 1"))?;
        story.select_prompt(index).context("--prompt")?;
    }
    debug!(
        prompt = story.selected_prompt_index(),
        players = ?story.players(),
        max_turns = ?story.max_turns(),
        "story ready"
    );
    Ok(story)
}

/// Headless when asked explicitly or when running under CI.
fn headless_mode(flag: bool) -> bool {
    flag || std::env::var("CI").is_ok_and(|value| is_truthy_flag(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_play_with_overrides() {
        let cli = Cli::parse_from([
            "spinyarn",
            "play",
            "--players",
            "Ann, Bo",
            "--max-turns",
            "4",
            "--prompt",
            "2",
        ]);
        match cli.command {
            Command::Play(args) => {
                assert_eq!(args.players.as_deref(), Some("Ann, Bo"));
                assert_eq!(args.max_turns, Some(4));
                assert_eq!(args.prompt, Some(2));
                assert!(!args.headless);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["spinyarn", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["spinyarn", "prompts", "--config", "alt.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn build_story_prefers_flags_over_config() {
        let cfg = SpinConfig {
            players: vec!["Cfg".to_string()],
            max_turns: Some(9),
            ..SpinConfig::default()
        };
        let args = PlayArgs {
            players: Some("Ann, Bo".to_string()),
            max_turns: Some(2),
            prompt: Some(3),
            ..PlayArgs::default()
        };

        let story = build_story(&cfg, &args).expect("story");
        assert_eq!(story.players(), ["Ann", "Bo"]);
        assert_eq!(story.max_turns(), Some(2));
        assert_eq!(story.selected_prompt_index(), 2);
    }

    #[test]
    fn build_story_rejects_prompt_zero_and_zero_turns() {
        let cfg = SpinConfig::default();
        let zero_prompt = PlayArgs {
            prompt: Some(0),
            ..PlayArgs::default()
        };
        assert!(build_story(&cfg, &zero_prompt).is_err());

        let zero_turns = PlayArgs {
            max_turns: Some(0),
            ..PlayArgs::default()
        };
        let err = build_story(&cfg, &zero_turns).unwrap_err();
        assert!(format!("{err:#}").contains("max turns must be positive"));
    }
}
