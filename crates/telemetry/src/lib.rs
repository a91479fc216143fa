//! Tracing subscriber bootstrap.

use anyhow::Context;
use libris_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the log filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("invalid log filter '{}'", settings.level)),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` if a subscriber was already installed (tests, or a
/// second bootstrap in the same process).
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<bool> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().flatten_event(true).try_init().is_ok(),
    };

    if installed {
        tracing::info!(
            target: "libris-telemetry",
            format = ?settings.log_format,
            level = %settings.level,
            "telemetry initialized"
        );
    }

    Ok(installed)
}
