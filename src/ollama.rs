//! Ollama client for the `/api/generate` endpoint
//!
//! Works against a local `ollama serve` as well as the hosted
//! `https://ollama.com` API (set `OLLAMA_API_KEY`).
//!
//! ```rust,no_run
//! use ethos_debate::{GenerationOptions, LlmClient, OllamaClient};
//!
//! # async fn demo() -> ethos_debate::Result<()> {
//! let client = OllamaClient::from_env()?;
//! let text = client
//!     .generate("You are terse.", "Say hi.", &GenerationOptions::new(32, 0.2))
//!     .await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

use crate::config::{GenerationOptions, OllamaConfig};
use crate::error::{Error, Result};
use crate::llm_client::LlmClient;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Ollama API client
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    /// Create a new client with the given configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/api/generate",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }
}

/// Render the chat-template prompt the generate endpoint expects
pub fn render_prompt(system_prompt: &str, user_prompt: &str) -> String {
    format!("<|system|>\n{}\n<|user|>\n{}\n", system_prompt, user_prompt)
}

/// Request body for `/api/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier
    pub model: String,
    /// Full rendered prompt
    pub prompt: String,
    /// Always false, the client reads a single response body
    pub stream: bool,
    /// Sampling options
    pub options: GenerateOptions,
}

/// Ollama sampling options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Temperature for sampling
    pub temperature: f32,
    /// Maximum tokens to predict
    pub num_predict: u32,
}

/// Response body from `/api/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Model used
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether generation finished
    #[serde(default)]
    pub done: bool,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: render_prompt(system_prompt, user_prompt),
            stream: false,
            options: GenerateOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let mut http_request = self.client.post(self.generate_url()).json(&request);
        if let Some(api_key) = self.config.api_key() {
            http_request = http_request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(format!("generate after {:?}", self.config.timeout))
            } else {
                Error::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::service(format!(
                "Request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response.json().await?;
        tracing::debug!(model = %body.model, chars = body.response.len(), "generation complete");
        Ok(body.response)
    }

    fn client_type(&self) -> &str {
        "ollama"
    }

    fn endpoint(&self) -> &str {
        self.config.base_url.as_str()
    }
}
