use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::TelemetrySettings;

/// Installs the global subscriber. Output goes to the configured log file
/// because the terminal UI owns stdout.
pub fn init_tracing(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("Failed to open log file {}", settings.log_file.display()))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    if settings.json {
        builder
            .json()
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    } else {
        builder
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }

    Ok(())
}
