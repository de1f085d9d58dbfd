//! Tracing configuration.

use judge_core::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Configure the global subscriber: env-filtered stdout logging.
pub fn configure_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,codejudge=debug,judge_worker=debug".into()),
    );

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}
