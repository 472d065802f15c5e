use tracing_subscriber::fmt::layer;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber with structured JSON output.
///
/// Fails if the host application already installed one.
pub fn init_tracing() -> Result<(), TryInitError> {
    Registry::default()
        .with(env_filter())
        .with(layer().json())
        .try_init()
}

/// Install a global subscriber with human-readable output for development.
pub fn init_tracing_pretty() -> Result<(), TryInitError> {
    Registry::default()
        .with(env_filter())
        .with(
            layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
}
