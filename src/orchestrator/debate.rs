//! Debate orchestrator
//!
//! Drives opening statements, rebuttal rounds, and the judge's verdict
//! across a roster of personas. The orchestrator keeps no debate state:
//! every call takes the caller's transcript and returns what to append.
//!
//! Per-agent calls within a phase are dispatched concurrently (bounded by
//! `max_concurrency`) and returned in roster order. A failed or malformed
//! reply never aborts a phase; it becomes a fallback turn.

use crate::config::GenerationOptions;
use crate::error::{Error, Result};
use crate::llm_client::LlmClient;
use crate::orchestrator::config::DebateConfig;
use crate::orchestrator::prompts::{judge_prompt, opening_prompt, rebuttal_prompt, JUDGE_SYSTEM_PROMPT};
use crate::orchestrator::transcript::{DebatePhase, Dilemma, Transcript, Turn, Verdict};
use crate::orchestrator::validation::{validate_rebuttal, ValidationWarning};
use crate::parser::{parse_turn, parse_verdict, ParsedVerdict};
use crate::persona::{fixed_persona, fixed_personas, Persona};
use crate::store::PersonaStore;
use crate::types::{AgentId, Stance};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

const FALLBACK_CONFIDENCE: u8 = 50;
const FALLBACK_RATIONALE: &str =
    "The judge gave no usable rationale; the verdict follows the debaters' final stances.";

/// Multi-agent ethical debate orchestrator
pub struct DebateOrchestrator {
    client: Arc<dyn LlmClient>,
    config: DebateConfig,
    store: Option<Arc<dyn PersonaStore>>,
}

impl DebateOrchestrator {
    /// Create an orchestrator over the fixed personas
    pub fn new(client: Arc<dyn LlmClient>, config: DebateConfig) -> Self {
        Self {
            client,
            config,
            store: None,
        }
    }

    /// Add custom personas from a store
    pub fn with_store(mut self, store: Arc<dyn PersonaStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Fixed personas in debate order, then custom personas in creation order
    pub async fn roster(&self) -> Vec<Persona> {
        let mut roster = fixed_personas().to_vec();
        if self.config.include_custom_agents {
            roster.extend(self.custom_personas().await);
        }
        roster
    }

    async fn custom_personas(&self) -> Vec<Persona> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        match store.list().await {
            Ok(personas) => {
                // Turns are keyed by name; a later persona sharing a name is left out
                let mut roster: Vec<Persona> = Vec::with_capacity(personas.len());
                for persona in &personas {
                    if roster.iter().any(|p| p.name.eq_ignore_ascii_case(&persona.name)) {
                        tracing::warn!(agent = %persona.name, id = %persona.id, "Duplicate persona name, skipping");
                        continue;
                    }
                    roster.push(persona.to_persona());
                }
                roster
            }
            Err(e) => {
                tracing::warn!("Failed to load custom personas, debating with fixed roster: {}", e);
                Vec::new()
            }
        }
    }

    /// Personas for the agents of an existing transcript, in order of first appearance
    async fn transcript_roster(&self, transcript: &Transcript) -> Vec<Persona> {
        let names = transcript.agents();
        let custom = if names.iter().all(|name| fixed_persona(name).is_some()) {
            Vec::new()
        } else {
            self.custom_personas().await
        };

        names
            .into_iter()
            .filter_map(|name| {
                let persona = fixed_persona(name)
                    .cloned()
                    .or_else(|| custom.iter().find(|p| p.name == name).cloned());
                if persona.is_none() {
                    tracing::warn!(agent = name, "Unknown agent in transcript, skipping");
                }
                persona
            })
            .collect()
    }

    async fn record_usage(&self, personas: &[Persona]) {
        let Some(store) = &self.store else {
            return;
        };
        for persona in personas.iter().filter(|p| fixed_persona(p.id.as_str()).is_none()) {
            if let Err(e) = store.record_usage(&persona.id).await {
                tracing::warn!(agent = %persona.name, "Failed to record usage: {}", e);
            }
        }
    }

    /// One generation call, collapsed into a turn
    async fn generate_turn(
        &self,
        persona: &Persona,
        user_prompt: &str,
        options: GenerationOptions,
        round: u32,
    ) -> Turn {
        let start = Instant::now();
        let reply = self.call(&persona.system_prompt, user_prompt, &options).await;

        match reply {
            Ok(raw) => {
                let parsed = parse_turn(&raw);
                tracing::debug!(
                    agent = %persona.name,
                    round,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    fallback = parsed.is_fallback,
                    "Turn generated"
                );
                if parsed.is_fallback {
                    tracing::warn!(agent = %persona.name, round, "Reply needed repair");
                    Turn::from_parsed(&persona.name, round, parsed).with_raw(raw)
                } else {
                    Turn::from_parsed(&persona.name, round, parsed)
                }
            }
            Err(e) => {
                tracing::warn!(agent = %persona.name, round, "Agent {} failed: {}", persona.name, e);
                Turn::failed(&persona.name, round)
            }
        }
    }

    /// A generation call bounded by the configured timeout
    async fn call(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        let timeout = self.config.call_timeout();
        tokio::time::timeout(timeout, self.client.generate(system_prompt, user_prompt, options))
            .await
            .map_err(|_| Error::timeout(format!("No reply within {}s", timeout.as_secs())))?
    }

    /// Run one prompt per persona concurrently, keeping roster order
    async fn fan_out(
        &self,
        jobs: Vec<(Persona, String)>,
        options: GenerationOptions,
        round: u32,
    ) -> Vec<Turn> {
        stream::iter(jobs)
            .map(|(persona, prompt)| async move {
                self.generate_turn(&persona, &prompt, options, round).await
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Opening statements from every roster agent
    pub async fn run_opening(&self, dilemma: &Dilemma) -> Result<Vec<Turn>> {
        let span = tracing::info_span!("debate_phase", phase = %DebatePhase::Opening, title = %dilemma.title);
        async {
            let roster = self.roster().await;
            let prompt = opening_prompt(dilemma);
            let jobs = roster
                .iter()
                .map(|persona| (persona.clone(), prompt.clone()))
                .collect();

            let turns = self.fan_out(jobs, self.config.opening, 0).await;
            self.record_usage(&roster).await;

            tracing::info!(
                agents = turns.len(),
                fallbacks = turns.iter().filter(|t| t.is_fallback).count(),
                "Opening complete"
            );
            Ok(turns)
        }
        .instrument(span)
        .await
    }

    /// Opening statement from a single agent, fixed or custom
    pub async fn run_agent(&self, agent_id: &AgentId, dilemma: &Dilemma) -> Result<Turn> {
        let persona = match fixed_persona(agent_id.as_str()) {
            Some(persona) => persona.clone(),
            None => {
                let store = self
                    .store
                    .as_ref()
                    .ok_or_else(|| Error::not_found(agent_id.to_string()))?;
                store
                    .get(agent_id)
                    .await?
                    .ok_or_else(|| Error::not_found(agent_id.to_string()))?
                    .to_persona()
            }
        };

        let turn = self
            .generate_turn(&persona, &opening_prompt(dilemma), self.config.opening, 0)
            .instrument(tracing::info_span!("debate_agent", agent = %persona.name))
            .await;
        self.record_usage(std::slice::from_ref(&persona)).await;
        Ok(turn)
    }

    /// One rebuttal round from every agent in the transcript.
    ///
    /// Every agent sees the transcript as it stood when the round began.
    pub async fn run_continue(&self, transcript: &Transcript) -> Result<Vec<Turn>> {
        if transcript.turns.is_empty() {
            return Err(Error::invalid_input(
                "Transcript has no turns; run the opening first",
            ));
        }
        let round = transcript.rounds_completed() + 1;
        let phase = DebatePhase::Rebuttal { round };
        let span = tracing::info_span!("debate_phase", phase = %phase);

        async {
            let roster = self.transcript_roster(transcript).await;
            if roster.is_empty() {
                return Err(Error::invalid_input("Transcript names no known agents"));
            }

            let jobs = roster
                .iter()
                .map(|persona| {
                    let prompt = rebuttal_prompt(transcript, &persona.name, round);
                    (persona.clone(), prompt)
                })
                .collect();
            let turns = self.fan_out(jobs, self.config.rebuttal, round).await;

            let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
            let warnings = self.check_rebuttals(&turns, &names);
            for warning in &warnings {
                tracing::warn!("{}", warning);
            }

            tracing::info!(
                agents = turns.len(),
                warnings = warnings.len(),
                "Rebuttal round complete"
            );
            Ok(turns)
        }
        .instrument(span)
        .await
    }

    /// Advisory validation of a round's rebuttals
    pub fn check_rebuttals(&self, turns: &[Turn], roster: &[&str]) -> Vec<ValidationWarning> {
        turns
            .iter()
            .filter_map(|turn| validate_rebuttal(turn, roster, self.config.min_rebuttal_chars))
            .collect()
    }

    /// The judge's verdict over the complete transcript
    pub async fn run_judge(&self, transcript: &Transcript) -> Result<Verdict> {
        if transcript.turns.is_empty() {
            return Err(Error::invalid_input("Cannot judge an empty transcript"));
        }
        let span = tracing::info_span!(
            "debate_phase",
            phase = "judging",
            rounds = transcript.rounds_completed()
        );

        async {
            let parsed = match self
                .call(JUDGE_SYSTEM_PROMPT, &judge_prompt(transcript), &self.config.judge)
                .await
            {
                Ok(raw) => parse_verdict(&raw),
                Err(e) => {
                    tracing::warn!("Judge failed, deriving verdict from stances: {}", e);
                    ParsedVerdict {
                        is_fallback: true,
                        ..Default::default()
                    }
                }
            };

            let verdict = assemble_verdict(parsed, transcript);
            tracing::info!(
                winner = %verdict.winner,
                recommendation = %verdict.final_recommendation,
                confidence = verdict.confidence,
                fallback = verdict.is_fallback,
                "Verdict reached"
            );
            Ok(verdict)
        }
        .instrument(span)
        .await
    }
}

/// Majority of the agents' latest stances; ties go to the first agent's stance
fn majority_stance(latest: &[(&str, Stance)]) -> Stance {
    let b_votes = latest.iter().filter(|(_, s)| *s == Stance::B).count();
    let a_votes = latest.len() - b_votes;
    match a_votes.cmp(&b_votes) {
        std::cmp::Ordering::Greater => Stance::A,
        std::cmp::Ordering::Less => Stance::B,
        std::cmp::Ordering::Equal => latest.first().map(|(_, s)| *s).unwrap_or_default(),
    }
}

/// Match the judge's winner to a debater name, exactly first, then by mention
fn match_winner<'a>(claimed: &str, roster: &[&'a str]) -> Option<&'a str> {
    let claimed = claimed.trim().to_lowercase();
    roster
        .iter()
        .find(|name| name.to_lowercase() == claimed)
        .or_else(|| roster.iter().find(|name| claimed.contains(&name.to_lowercase())))
        .copied()
}

/// Normalize a parsed judge reply against the transcript's debaters
fn assemble_verdict(parsed: ParsedVerdict, transcript: &Transcript) -> Verdict {
    let roster = transcript.agents();
    let latest = transcript.latest_stances();
    let majority = majority_stance(&latest);

    let matched = parsed
        .winner
        .as_deref()
        .and_then(|claimed| match_winner(claimed, &roster));
    if matched.is_none() {
        if let Some(claimed) = &parsed.winner {
            tracing::warn!(claimed = %claimed, "Judge named an unknown winner");
        }
    }

    let winner = matched
        .or_else(|| {
            latest
                .iter()
                .find(|(_, stance)| *stance == majority)
                .map(|(agent, _)| *agent)
        })
        .unwrap_or_default()
        .to_string();

    Verdict {
        winner,
        rationale: parsed
            .rationale
            .unwrap_or_else(|| FALLBACK_RATIONALE.to_string()),
        final_recommendation: parsed.final_recommendation.unwrap_or(majority),
        confidence: parsed.confidence.unwrap_or(FALLBACK_CONFIDENCE),
        is_fallback: parsed.is_fallback || matched.is_none(),
    }
}
