//! Log output for the native library.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a `tracing` subscriber writing to stderr.
///
/// An empty filter falls back to `RUST_LOG`, then to `info`. Returns
/// `Ok(false)` if a subscriber was already installed.
pub fn init(filter: &str) -> anyhow::Result<bool> {
    let filter = if filter.trim().is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_new(filter)?
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .try_init()
        .is_ok();

    Ok(installed)
}
