//! Configuration types for the generation service

use crate::error::{Error, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default hosted Ollama endpoint
pub const DEFAULT_BASE_URL: &str = "https://ollama.com";

/// Default model served by the endpoint
pub const DEFAULT_MODEL: &str = "gpt-oss:20b-cloud";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Sampling options passed with every generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature for sampling (0.0-2.0)
    pub temperature: f32,
}

impl GenerationOptions {
    /// Create a new set of options
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 480,
            temperature: 0.7,
        }
    }
}

/// Ollama client configuration
#[derive(Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub base_url: Url,
    /// Model identifier
    pub model: String,
    /// Bearer token for hosted deployments
    pub api_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl OllamaConfig {
    /// Create a configuration for the given server
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env if present so local development picks up OLLAMA_API_KEY
        let _ = dotenv();

        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.model = model;
        }
        config.api_key = std::env::var("OLLAMA_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from);
        if let Ok(secs) = std::env::var("OLLAMA_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::config(format!("OLLAMA_TIMEOUT_SECS is not a number: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the API key as a string
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret())
    }
}

impl std::fmt::Debug for OllamaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_config_builder() {
        let config = OllamaConfig::new("http://localhost:11434")
            .unwrap()
            .with_model("llama3.1:8b")
            .with_api_key("test-key")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.base_url.as_str(), "http://localhost:11434/");
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.api_key(), Some("test-key"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_ollama_config_rejects_bad_url() {
        assert!(matches!(OllamaConfig::new("not a url"), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = OllamaConfig::new(DEFAULT_BASE_URL)
            .unwrap()
            .with_api_key("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_generation_options_builder() {
        let options = GenerationOptions::default()
            .with_max_tokens(400)
            .with_temperature(0.3);
        assert_eq!(options, GenerationOptions::new(400, 0.3));
    }
}
