//! Process-wide logging setup

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, filter::ParseError, fmt};

fn default_level() -> String {
    "info".to_owned()
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Raise the level for `-v` flags: one means debug, more means trace.
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.level = "debug".to_owned(),
            _ => self.level = "trace".to_owned(),
        }
        self
    }

    fn filter(&self) -> Result<EnvFilter, ParseError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level),
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::level`].
///
/// # Errors
/// Fails on an invalid filter directive or when a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = config.filter()?;

    let output = if config.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(config.with_target)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.with_target)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(LoggingConfig::default().with_verbosity(0).level, "info");
        assert_eq!(LoggingConfig::default().with_verbosity(1).level, "debug");
        assert_eq!(LoggingConfig::default().with_verbosity(3).level, "trace");
    }

    #[test]
    fn invalid_directive_is_rejected() {
        temp_env::with_var_unset("RUST_LOG", || {
            let cfg = LoggingConfig {
                level: "faultkit=notalevel".to_owned(),
                ..LoggingConfig::default()
            };
            assert!(matches!(init_logging(&cfg), Err(TelemetryError::Filter(_))));
        });
    }

    #[test]
    fn partial_config_deserializes() {
        let cfg: LoggingConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert!(cfg.json);
        assert_eq!(cfg.level, "info");
        assert!(cfg.with_target);
    }
}
