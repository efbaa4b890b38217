//! Tracing Setup
//!
//! Installs a `tracing-subscriber` formatter from [`LoggingConfig`].
//!
//! # Configuration
//!
//! - `RUST_LOG`: overrides `observability.logging.level` when set
//! - `observability.logging.format`: `json` for structured output, `pretty`
//!   for local runs
//! - `observability.logging.include_spans`: emit an event as each window
//!   span closes, with its timing
//!
//! # Usage
//!
//! ```rust,ignore
//! use walkforward_engine::{config::load_config, telemetry::init_logging};
//!
//! let config = load_config(None)?;
//! init_logging(&config.observability.logging)?;
//! ```

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns error if the level directive cannot be parsed or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level directive '{}'", config.level))?,
    };

    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_span_events(span_events)
        .with_target(true);

    let installed = if config.format == "pretty" {
        builder.pretty().try_init()
    } else {
        builder.json().with_current_span(true).try_init()
    };
    installed
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        level = %config.level,
        format = %config.format,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "walkforward_engine=notalevel".to_string(),
            ..Default::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert!(init_logging(&config).is_err());
        }
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            include_spans: false,
        };
        // The first call may lose to another test in this binary.
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
