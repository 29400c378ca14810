//! Structural invariants of a story, checked after every mutation in debug builds.

use crate::core::story::StoryState;
use crate::core::types::HistoryEntry;

/// Check invariants that the type system does not enforce:
/// - selected prompt index in range
/// - non-empty roster
/// - turn cursor never ahead of the story body
/// - history holds at least one `added` entry per visible line
pub fn validate_invariants(story: &StoryState) -> Vec<String> {
    let mut errors = Vec::new();

    if story.selected_prompt_index() >= story.prompts().len() {
        errors.push(format!(
            "selected prompt {} out of range for {} prompts",
            story.selected_prompt_index(),
            story.prompts().len()
        ));
    }

    if story.players().is_empty() {
        errors.push("roster must not be empty".to_string());
    }

    if story.turn_cursor() > story.lines().len() {
        errors.push(format!(
            "turn cursor {} ahead of {} lines",
            story.turn_cursor(),
            story.lines().len()
        ));
    }

    let added = story
        .history()
        .iter()
        .filter(|entry| matches!(entry, HistoryEntry::Added(_)))
        .count();
    if added < story.lines().len() {
        errors.push(format!(
            "history records {} additions but story has {} lines",
            added,
            story.lines().len()
        ));
    }

    errors
}
