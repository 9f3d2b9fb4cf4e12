//! Log output setup

use tracing_subscriber::{EnvFilter, fmt};

/// Filter applied when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "trivia_round=info";

/// Installs the global `tracing` subscriber
///
/// Logs go to stderr so stdout stays free for event output. Calling this
/// more than once keeps the first subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
