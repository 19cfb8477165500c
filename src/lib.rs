//! # Ethos Debate
//!
//! Multi-agent ethical debates between LLM personas, built with Rust.
//!
//! Three fixed personas (a deontologist, a consequentialist and a virtue
//! ethicist) plus any user-defined personas argue a two-option dilemma
//! through an opening / rebuttal / judgment protocol. Model replies are
//! parsed tolerantly, and no single failed call can abort a debate.
//!
//! ## Features
//!
//! - **Stateless orchestration**: callers hold the transcript; each call advances one phase
//! - **Tolerant parsing**: JSON, fenced JSON, JSON with noise, truncated JSON, or prose
//! - **Bounded concurrency**: per-agent calls run in parallel and come back in roster order
//! - **Persona builder**: heuristic scoring of descriptions and LLM-backed enhancement
//! - **Pluggable storage**: in-memory or sled-backed custom persona store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ethos_debate::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(OllamaClient::from_env()?);
//!     let orchestrator = DebateOrchestrator::new(client, DebateConfig::default());
//!
//!     let mut transcript = Transcript::new(Dilemma::new(
//!         "Academic Integrity vs Compassion",
//!         "Decline to write the student's paper",
//!         "Quietly write the paper",
//!         "Family emergency; honor code exists",
//!     ));
//!     transcript.extend(orchestrator.run_opening(&transcript.dilemma).await?);
//!     transcript.extend(orchestrator.run_continue(&transcript).await?);
//!     let verdict = orchestrator.run_judge(&transcript).await?;
//!     println!("{} wins: {}", verdict.winner, verdict.rationale);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod enhancer;
pub mod error;
pub mod llm_client;
pub mod ollama;
pub mod orchestrator;
pub mod parser;
pub mod persona;
pub mod scoring;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-exports for convenience
pub use config::{GenerationOptions, OllamaConfig};
pub use enhancer::{EnhancementResult, PersonaEnhancer};
pub use error::{Error, Result};
pub use llm_client::LlmClient;
pub use ollama::OllamaClient;
pub use orchestrator::{
    DebateConfig, DebateOrchestrator, DebatePhase, Dilemma, Transcript, Turn, ValidationWarning,
    Verdict,
};
pub use parser::{parse_turn, parse_verdict, ParsedTurn, ParsedVerdict};
pub use persona::{AgentRating, CustomPersona, Persona, PersonaDraft, PersonaUpdate};
pub use scoring::{analyze, analyze_description, AnalysisScores, DescriptionAnalysis};
pub use store::{
    ensure_unique_name, update_persona, InMemoryPersonaStore, PersonaStore, SledPersonaStore,
};
pub use telemetry::{init_tracing, TelemetryConfig};
pub use types::{AgentId, Stance};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{GenerationOptions, OllamaConfig};
    pub use crate::enhancer::{EnhancementResult, PersonaEnhancer};
    pub use crate::error::{Error, Result};
    pub use crate::llm_client::LlmClient;
    pub use crate::ollama::OllamaClient;
    pub use crate::orchestrator::{DebateConfig, DebateOrchestrator, Dilemma, Transcript, Turn, Verdict};
    pub use crate::persona::{CustomPersona, Persona, PersonaDraft};
    pub use crate::store::{InMemoryPersonaStore, PersonaStore};
    pub use crate::types::*;
}
