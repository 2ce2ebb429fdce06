//! Tracing subscriber setup

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "trackmatch=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Install the global subscriber, plain text or JSON.
///
/// Fails if a subscriber is already installed; callers that set up their own
/// tracing can ignore the error.
pub fn init_tracing(json: bool) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.context("Failed to install tracing subscriber")
}
