//! Orchestrator module - the opening / rebuttal / judgment protocol
//!
//! The debate advances one phase per call. Callers hold the [`Transcript`]
//! and feed it back in:
//!
//! - **Opening**: every roster agent picks a side ([`DebateOrchestrator::run_opening`])
//! - **Rebuttal**: every agent answers the others ([`DebateOrchestrator::run_continue`])
//! - **Judging**: one verdict over the whole transcript ([`DebateOrchestrator::run_judge`])
//!
//! # Example
//!
//! ```rust,ignore
//! use ethos_debate::orchestrator::{DebateConfig, DebateOrchestrator, Dilemma, Transcript};
//!
//! let config = DebateConfig::from_file("debate.yaml")?;
//! let orchestrator = DebateOrchestrator::new(client, config);
//! let mut transcript = Transcript::new(Dilemma::new("T", "A", "B", "C"));
//! transcript.extend(orchestrator.run_opening(&transcript.dilemma).await?);
//! transcript.extend(orchestrator.run_continue(&transcript).await?);
//! let verdict = orchestrator.run_judge(&transcript).await?;
//! ```

pub mod config;
pub mod debate;
pub mod prompts;
pub mod transcript;
pub mod validation;

// Re-exports
pub use config::DebateConfig;
pub use debate::DebateOrchestrator;
pub use transcript::{DebatePhase, Dilemma, Transcript, Turn, Verdict};
pub use validation::{validate_rebuttal, ValidationWarning, WarningKind};
