//! Log subscriber setup

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How logs are filtered and formatted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit newline-delimited JSON instead of human-readable lines
    #[serde(default)]
    pub json: bool,
    /// Include the event target (module path)
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "ethos_debate=info".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            with_target: default_with_target(),
        }
    }
}

impl TelemetryConfig {
    /// Set the default filter directive
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Switch to JSON output
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter)
                .map_err(|e| Error::config(format!("Invalid log filter {:?}: {}", self.filter, e))),
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which is not an error.
pub fn init_tracing(config: &TelemetryConfig) -> Result<bool> {
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_target(config.with_target))
            .try_init()
            .is_ok()
    } else {
        registry
            .with(fmt::layer().with_target(config.with_target))
            .try_init()
            .is_ok()
    };
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = TelemetryConfig::default().with_filter("ethos_debate=loudest");
        assert!(matches!(init_tracing(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = TelemetryConfig::default().with_json(true);
        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }
}
