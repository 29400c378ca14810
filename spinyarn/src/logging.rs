//! Diagnostic tracing for the story tool.
//!
//! Tracing goes to stderr so it never mixes with the session transcript on
//! stdout. The level comes from `RUST_LOG`; `--verbose` raises the default.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn`, or `spinyarn=debug` when
/// `verbose` is set. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=spinyarn=debug spinyarn play
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "spinyarn=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
