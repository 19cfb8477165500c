//! Generation capability consumed by the debate core

use crate::config::GenerationOptions;
use crate::error::Result;
use async_trait::async_trait;

/// A text-generation backend.
///
/// Implementations fail with a service error ([`crate::Error::Service`],
/// [`crate::Error::Timeout`] or [`crate::Error::Http`]) on non-success status or
/// timeout. Callers assume no retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given system and user prompts
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String>;

    /// Get the client type for debugging/logging
    fn client_type(&self) -> &str;

    /// Get the endpoint the client talks to
    fn endpoint(&self) -> &str;
}
