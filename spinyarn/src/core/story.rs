//! Turn-based story state machine.
//!
//! [`StoryState`] is the single source of truth for a session: which prompt is
//! active, who plays next, the lines contributed so far, and the audit trail of
//! add/undo events. Every operation either applies its full effect or returns a
//! [`StoryError`] with the state left untouched.

use tracing::debug;

use crate::core::error::StoryError;
use crate::core::invariants::validate_invariants;
use crate::core::roster::{default_players, normalize_names};
use crate::core::types::HistoryEntry;

/// State of one collaborative story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryState {
    prompts: Vec<String>,
    selected: usize,
    players: Vec<String>,
    max_turns: Option<u32>,
    lines: Vec<String>,
    turn_cursor: usize,
    history: Vec<HistoryEntry>,
}

impl StoryState {
    /// Create a story over `prompts` with the default two-player roster.
    pub fn new(prompts: Vec<String>) -> Result<Self, StoryError> {
        Self::with_players(prompts, default_players())
    }

    /// Create a story over `prompts` with an initial roster.
    ///
    /// The roster is filtered like [`set_players`](Self::set_players); if nothing
    /// survives, the default roster is used instead.
    pub fn with_players<I, S>(prompts: Vec<String>, players: I) -> Result<Self, StoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if prompts.is_empty() {
            return Err(StoryError::InvalidArgument(
                "at least one prompt must be provided".to_string(),
            ));
        }
        let mut players = normalize_names(players);
        if players.is_empty() {
            players = default_players();
        }
        debug!(
            prompts = prompts.len(),
            players = players.len(),
            "story created"
        );
        Ok(Self {
            prompts,
            selected: 0,
            players,
            max_turns: None,
            lines: Vec::new(),
            turn_cursor: 0,
            history: Vec::new(),
        })
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn selected_prompt_index(&self) -> usize {
        self.selected
    }

    pub fn selected_prompt(&self) -> &str {
        &self.prompts[self.selected]
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn max_turns(&self) -> Option<u32> {
        self.max_turns
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn turn_cursor(&self) -> usize {
        self.turn_cursor
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Select the active prompt and start a fresh story.
    ///
    /// Discards the current lines and history.
    pub fn select_prompt(&mut self, index: usize) -> Result<(), StoryError> {
        if index >= self.prompts.len() {
            debug!(index, len = self.prompts.len(), "prompt selection rejected");
            return Err(StoryError::OutOfRange {
                index,
                len: self.prompts.len(),
            });
        }
        self.selected = index;
        self.reset_story();
        debug!(index, "prompt selected");
        Ok(())
    }

    /// Replace the roster and restart rotation at the first player.
    ///
    /// Names are trimmed and empty ones dropped. If nothing remains the current
    /// roster is kept. Lines are not cleared: only the rotation restarts.
    pub fn set_players<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = normalize_names(names);
        if names.is_empty() {
            debug!("empty roster ignored");
            return;
        }
        debug!(players = names.len(), "roster replaced");
        self.players = names;
        self.turn_cursor = 0;
        self.debug_check();
    }

    /// Set or clear the turn limit.
    ///
    /// Lowering the limit below the current line count does not trim the story;
    /// it only blocks further additions.
    pub fn set_max_turns(&mut self, max_turns: Option<u32>) -> Result<(), StoryError> {
        if max_turns == Some(0) {
            return Err(StoryError::InvalidArgument(
                "max turns must be positive if provided".to_string(),
            ));
        }
        debug!(?max_turns, "turn limit set");
        self.max_turns = max_turns;
        Ok(())
    }

    /// True if another line may be added under the current limit.
    pub fn can_add_line(&self) -> bool {
        match self.max_turns {
            None => true,
            Some(limit) => self.lines.len() < limit as usize,
        }
    }

    /// Append a line for the current player.
    ///
    /// The text is trimmed before it is stored. All checks run before any field
    /// is touched.
    pub fn add_line(&mut self, text: &str) -> Result<(), StoryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoryError::InvalidArgument(
                "cannot add empty line".to_string(),
            ));
        }
        if let Some(max_turns) = self.max_turns
            && !self.can_add_line()
        {
            debug!(max_turns, "line rejected at turn limit");
            return Err(StoryError::LimitReached { max_turns });
        }

        debug!(player = %self.current_player(), turn = self.turn_number(), "line added");
        self.lines.push(text.to_string());
        self.history.push(HistoryEntry::Added(text.to_string()));
        self.turn_cursor += 1;
        self.debug_check();
        Ok(())
    }

    /// Remove the most recent line.
    ///
    /// Returns `false` and changes nothing when the story body is empty.
    pub fn undo(&mut self) -> bool {
        let Some(last) = self.lines.pop() else {
            return false;
        };
        debug!(line = %last, "line undone");
        self.history.push(HistoryEntry::Undid(last));
        self.turn_cursor = self.turn_cursor.saturating_sub(1);
        self.debug_check();
        true
    }

    /// Clear lines, history and rotation. Prompt, roster and limit are kept.
    pub fn reset_story(&mut self) {
        self.turn_cursor = 0;
        self.lines.clear();
        self.history.clear();
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> &str {
        &self.players[self.turn_cursor % self.players.len()]
    }

    /// 1-based number of the turn about to be played.
    pub fn turn_number(&self) -> usize {
        self.lines.len() + 1
    }

    /// Render the story: prompt, blank line, then one line per contribution.
    ///
    /// The result is trimmed and ends with exactly one newline. This is the text
    /// that gets displayed, saved and narrated.
    pub fn build_story(&self) -> String {
        let mut story = String::new();
        story.push_str(self.selected_prompt().trim());
        story.push_str("\n\n");
        story.push_str(&self.lines.join("\n"));
        let mut story = story.trim().to_string();
        story.push('\n');
        story
    }

    fn debug_check(&self) {
        debug_assert!(
            validate_invariants(self).is_empty(),
            "story invariants violated: {:?}",
            validate_invariants(self)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> StoryState {
        StoryState::with_players(vec!["p1".to_string(), "p2".to_string()], ["A", "B"])
            .expect("story")
    }

    #[test]
    fn initial_state_selects_first_prompt_and_player() {
        let story = story();
        assert_eq!(story.selected_prompt_index(), 0);
        assert_eq!(story.selected_prompt(), "p1");
        assert_eq!(story.turn_number(), 1);
        assert_eq!(story.current_player(), "A");
    }

    #[test]
    fn new_uses_default_roster() {
        let story = StoryState::new(vec!["p".to_string()]).expect("story");
        assert_eq!(story.players(), ["Player 1", "Player 2"]);
        assert_eq!(story.current_player(), "Player 1");
    }

    #[test]
    fn construction_rejects_empty_prompt_list() {
        let err = StoryState::new(Vec::new()).unwrap_err();
        assert!(matches!(err, StoryError::InvalidArgument(_)));
    }

    #[test]
    fn blank_initial_roster_falls_back_to_default() {
        let story = StoryState::with_players(vec!["p".to_string()], [" ", ""]).expect("story");
        assert_eq!(story.players(), ["Player 1", "Player 2"]);
    }

    #[test]
    fn add_then_undo_restores_rotation() {
        let mut story = story();
        story.add_line("hello").expect("add");
        assert!(story.build_story().contains("hello"));
        assert_eq!(story.current_player(), "B");
        assert_eq!(story.turn_number(), 2);

        assert!(story.undo());
        assert!(!story.build_story().contains("hello"));
        assert_eq!(story.current_player(), "A");
        assert_eq!(story.turn_number(), 1);
    }

    /// Undo is an identity on the body and rotation, never on the audit trail.
    #[test]
    fn undo_keeps_history_growing() {
        let mut story = story();
        story.add_line("first").expect("add");
        let before = story.clone();

        story.add_line("second").expect("add");
        assert!(story.undo());

        assert_eq!(story.lines(), before.lines());
        assert_eq!(story.turn_cursor(), before.turn_cursor());
        assert_eq!(story.current_player(), before.current_player());
        assert_eq!(
            story.history(),
            [
                HistoryEntry::Added("first".to_string()),
                HistoryEntry::Added("second".to_string()),
                HistoryEntry::Undid("second".to_string()),
            ]
        );
    }

    #[test]
    fn undo_on_empty_story_is_a_no_op() {
        let mut story = story();
        let before = story.clone();
        assert!(!story.undo());
        assert_eq!(story, before);
    }

    #[test]
    fn repeated_undo_removes_lines_in_reverse_order() {
        let mut story = story();
        for line in ["one", "two", "three"] {
            story.add_line(line).expect("add");
        }
        assert!(story.undo());
        assert_eq!(story.lines(), ["one", "two"]);
        assert!(story.undo());
        assert_eq!(story.lines(), ["one"]);
    }

    #[test]
    fn add_line_trims_text() {
        let mut story = story();
        story.add_line("  spaced out \n").expect("add");
        assert_eq!(story.lines(), ["spaced out"]);
    }

    #[test]
    fn add_line_rejects_blank_text_without_mutation() {
        let mut story = story();
        let before = story.clone();
        let err = story.add_line("   ").unwrap_err();
        assert_eq!(
            err,
            StoryError::InvalidArgument("cannot add empty line".to_string())
        );
        assert_eq!(story, before);
    }

    #[test]
    fn max_turns_blocks_the_next_line() {
        let mut story = story();
        story.set_max_turns(Some(1)).expect("limit");
        story.add_line("one").expect("add");
        let before = story.clone();

        let err = story.add_line("two").unwrap_err();
        assert_eq!(err, StoryError::LimitReached { max_turns: 1 });
        assert_eq!(story.lines(), ["one"]);
        assert_eq!(story, before);
    }

    #[test]
    fn every_limit_accepts_exactly_that_many_lines() {
        for limit in 1..=6u32 {
            let mut story = story();
            story.set_max_turns(Some(limit)).expect("limit");
            for turn in 0..limit {
                story.add_line(&format!("line {turn}")).expect("add");
            }
            assert!(!story.can_add_line());
            assert!(matches!(
                story.add_line("overflow"),
                Err(StoryError::LimitReached { .. })
            ));
            assert_eq!(story.lines().len(), limit as usize);
        }
    }

    #[test]
    fn set_max_turns_rejects_zero() {
        let mut story = story();
        story.set_max_turns(Some(4)).expect("limit");
        let err = story.set_max_turns(Some(0)).unwrap_err();
        assert!(matches!(err, StoryError::InvalidArgument(_)));
        assert_eq!(story.max_turns(), Some(4));
    }

    #[test]
    fn lowering_the_limit_does_not_trim_lines() {
        let mut story = story();
        for line in ["a", "b", "c"] {
            story.add_line(line).expect("add");
        }
        story.set_max_turns(Some(1)).expect("limit");
        assert_eq!(story.lines().len(), 3);
        assert!(!story.can_add_line());

        story.set_max_turns(None).expect("clear limit");
        assert!(story.can_add_line());
    }

    #[test]
    fn select_prompt_resets_story() {
        let mut story = story();
        story.add_line("x").expect("add");
        story.select_prompt(1).expect("select");
        assert_eq!(story.selected_prompt(), "p2");
        assert!(!story.build_story().contains('x'));
        assert!(story.lines().is_empty());
        assert!(story.history().is_empty());
        assert_eq!(story.turn_cursor(), 0);
    }

    #[test]
    fn select_prompt_out_of_range_leaves_state() {
        let mut story = story();
        story.add_line("keep").expect("add");
        let before = story.clone();
        let err = story.select_prompt(2).unwrap_err();
        assert_eq!(err, StoryError::OutOfRange { index: 2, len: 2 });
        assert_eq!(story, before);
    }

    #[test]
    fn set_players_restarts_rotation_but_keeps_lines() {
        let mut story = story();
        story.add_line("one").expect("add");
        assert_eq!(story.current_player(), "B");

        story.set_players(["X", "Y", "Z"]);
        assert_eq!(story.current_player(), "X");
        assert_eq!(story.lines(), ["one"]);
        assert_eq!(story.turn_number(), 2);

        story.add_line("two").expect("add");
        assert_eq!(story.current_player(), "Y");
    }

    #[test]
    fn set_players_ignores_empty_roster() {
        let mut story = story();
        story.add_line("one").expect("add");
        let before = story.clone();

        story.set_players(crate::core::roster::parse_roster(""));
        story.set_players(crate::core::roster::parse_roster("   ,  ,"));
        assert_eq!(story, before);
    }

    #[test]
    fn undo_after_roster_change_does_not_underflow_cursor() {
        let mut story = story();
        story.add_line("one").expect("add");
        story.add_line("two").expect("add");
        story.set_players(["Solo"]);

        assert!(story.undo());
        assert_eq!(story.turn_cursor(), 0);
        assert_eq!(story.lines(), ["one"]);
        assert_eq!(story.current_player(), "Solo");
    }

    #[test]
    fn rotation_wraps_around_roster() {
        let mut story = story();
        let mut seen = Vec::new();
        for turn in 0..5 {
            seen.push(story.current_player().to_string());
            story.add_line(&format!("line {turn}")).expect("add");
        }
        assert_eq!(seen, ["A", "B", "A", "B", "A"]);
    }

    #[test]
    fn reset_story_keeps_configuration() {
        let mut story = story();
        story.select_prompt(1).expect("select");
        story.set_players(["Q"]);
        story.set_max_turns(Some(3)).expect("limit");
        story.add_line("gone").expect("add");

        story.reset_story();
        assert!(story.lines().is_empty());
        assert!(story.history().is_empty());
        assert_eq!(story.turn_cursor(), 0);
        assert_eq!(story.selected_prompt_index(), 1);
        assert_eq!(story.players(), ["Q"]);
        assert_eq!(story.max_turns(), Some(3));
    }

    #[test]
    fn build_story_formats_prompt_blank_line_and_body() {
        let mut story = StoryState::new(vec!["  Once upon a time.  ".to_string()]).expect("story");
        assert_eq!(story.build_story(), "Once upon a time.\n");

        story.add_line("A fox appeared.").expect("add");
        story.add_line("It spoke.").expect("add");
        assert_eq!(
            story.build_story(),
            "Once upon a time.\n\nA fox appeared.\nIt spoke.\n"
        );
        assert_eq!(story.build_story(), story.build_story());
    }
}
