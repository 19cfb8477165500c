//! Debate configuration parsing from YAML
//!
//! Every field has a serde default, so an empty document yields
//! [`DebateConfig::default`].

use crate::config::GenerationOptions;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Maximum generation calls in flight within one phase
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-call timeout in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Options for opening statements
    #[serde(default = "default_opening")]
    pub opening: GenerationOptions,
    /// Options for rebuttals
    #[serde(default = "default_rebuttal")]
    pub rebuttal: GenerationOptions,
    /// Options for the judge
    #[serde(default = "default_judge")]
    pub judge: GenerationOptions,
    /// Minimum argument length for a rebuttal to count as valid
    #[serde(default = "default_min_rebuttal_chars")]
    pub min_rebuttal_chars: usize,
    /// Whether stored custom personas join the opening
    #[serde(default = "default_true")]
    pub include_custom_agents: bool,
}

fn default_max_concurrency() -> usize { 3 }
fn default_call_timeout_secs() -> u64 { 120 }
fn default_opening() -> GenerationOptions { GenerationOptions::new(480, 0.65) }
fn default_rebuttal() -> GenerationOptions { GenerationOptions::new(480, 0.7) }
fn default_judge() -> GenerationOptions { GenerationOptions::new(600, 0.3) }
fn default_min_rebuttal_chars() -> usize { 30 }
fn default_true() -> bool { true }

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            call_timeout_secs: default_call_timeout_secs(),
            opening: default_opening(),
            rebuttal: default_rebuttal(),
            judge: default_judge(),
            min_rebuttal_chars: default_min_rebuttal_chars(),
            include_custom_agents: true,
        }
    }
}

impl DebateConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml treats an empty document as unit, not an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Set the concurrency bound
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-call timeout.
    ///
    /// The timeout is kept in whole seconds: a fractional part rounds up, so
    /// anything under a second becomes 1s.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        let partial = u64::from(timeout.subsec_nanos() > 0);
        self.call_timeout_secs = timeout.as_secs().saturating_add(partial).max(1);
        self
    }

    /// Per-call timeout
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Reject settings the orchestrator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::config("max_concurrency must be at least 1"));
        }
        if self.call_timeout_secs == 0 {
            return Err(Error::config("call_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = DebateConfig::from_yaml("").unwrap();
        assert_eq!(config, DebateConfig::default());
        assert_eq!(config.opening, GenerationOptions::new(480, 0.65));
        assert_eq!(config.call_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_call_timeout_rounds_up_to_seconds() {
        let config = DebateConfig::default().with_call_timeout(Duration::from_millis(1500));
        assert_eq!(config.call_timeout(), Duration::from_secs(2));

        let config = DebateConfig::default().with_call_timeout(Duration::from_millis(200));
        assert_eq!(config.call_timeout(), Duration::from_secs(1));

        let config = DebateConfig::default().with_call_timeout(Duration::from_secs(30));
        assert_eq!(config.call_timeout_secs, 30);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
max_concurrency: 1
judge:
  max_tokens: 800
  temperature: 0.2
include_custom_agents: false
"#;
        let config = DebateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.judge, GenerationOptions::new(800, 0.2));
        assert_eq!(config.rebuttal, GenerationOptions::new(480, 0.7));
        assert!(!config.include_custom_agents);
        assert_eq!(config.min_rebuttal_chars, 30);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = DebateConfig::from_yaml("max_concurrency: 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate.yaml");
        std::fs::write(&path, "call_timeout_secs: 30\n").unwrap();

        let config = DebateConfig::from_file(&path).unwrap();
        assert_eq!(config.call_timeout(), Duration::from_secs(30));

        assert!(DebateConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }
}
