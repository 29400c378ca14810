//! Player roster parsing.

/// Default roster used when a story is created without explicit players.
pub const DEFAULT_PLAYERS: [&str; 2] = ["Player 1", "Player 2"];

/// Trim each name and drop the empty ones, preserving order.
///
/// Duplicate names are kept; rotation is by position, not by value.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Split a comma-separated roster (`"Ann, Bo ,, Cy"`) into trimmed names.
pub fn parse_roster(raw: &str) -> Vec<String> {
    normalize_names(raw.split(','))
}

/// The default roster as owned strings.
pub fn default_players() -> Vec<String> {
    DEFAULT_PLAYERS.iter().map(|name| name.to_string()).collect()
}
