//! Stable exit codes for `spinyarn` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid config, arguments, or an I/O failure.
pub const INVALID: i32 = 1;
/// `spinyarn read` could not narrate (no speech program, or playback failed).
pub const NARRATION_UNAVAILABLE: i32 = 2;
