//! Diagnostic tracing for the CLI.
//!
//! Logs go to stderr so stdout stays clean for the JSON the CLI prints.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Falls back to `debug` when `verbose` is set, `warn` otherwise.
///
/// # Example
/// ```bash
/// RUST_LOG=pfconfig=debug pfconfig get system:hostname
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
