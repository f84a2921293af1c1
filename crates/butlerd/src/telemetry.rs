//! Structured logging setup for the daemon.

use std::io::{self, IsTerminal};

use butlerd_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Proof that the global subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors raised while configuring logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive is malformed.
    #[error("invalid log filter '{filter}'")]
    Filter {
        /// Directive as configured.
        filter: String,
        /// Parser failure.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install log subscriber")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the global subscriber described by `config` on first use.
///
/// Later calls return a fresh handle without touching global state.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is malformed or another
/// subscriber already owns the global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let subscriber = build_subscriber(config)?;
            tracing::subscriber::set_global_default(subscriber)?;
            Ok::<_, TelemetryError>(())
        })
        .map(|_| TelemetryHandle)
}

/// Builds, without installing, the subscriber described by `config`.
///
/// Events go to stderr with UTC RFC 3339 timestamps and their targets.
/// Colour is used only on terminals.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter is malformed.
pub fn build_subscriber(
    config: &Config,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter()).map_err(|source| {
        TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            source,
        }
    })?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}

#[cfg(test)]
mod tests {
    use butlerd_config::Config;
    use rstest::rstest;

    use super::*;

    fn config_with(filter: &str, format: LogFormat) -> Config {
        Config {
            log_filter: filter.to_owned(),
            log_format: format,
        }
    }

    #[rstest]
    #[case::json(LogFormat::Json)]
    #[case::compact(LogFormat::Compact)]
    fn builds_subscriber_for_each_format(#[case] format: LogFormat) {
        let config = config_with("butlerd=debug,info", format);
        let subscriber = build_subscriber(&config).expect("valid filter");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "butlerd::dispatch", "telemetry smoke event");
        });
    }

    #[rstest]
    fn rejects_malformed_filter() {
        let config = config_with("butlerd=[", LogFormat::Compact);
        let err = build_subscriber(&config).err().expect("filter should be rejected");
        assert!(matches!(err, TelemetryError::Filter { ref filter, .. } if filter == "butlerd=["));
    }
}
