//! Tracing initialization

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the process
///
/// `RUST_LOG` wins over `filter` when set. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(filter)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
