//! End-to-end debate flow against a scripted generation backend

use async_trait::async_trait;
use ethos_debate::orchestrator::prompts::JUDGE_SYSTEM_PROMPT;
use ethos_debate::prelude::*;
use ethos_debate::{DebatePhase, PersonaEnhancer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Answers in character, addressing the next debater by name
struct ScriptedClient {
    calls: AtomicUsize,
    judge_reply: &'static str,
}

impl ScriptedClient {
    fn new(judge_reply: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            judge_reply,
        }
    }
}

fn speaker(system_prompt: &str) -> &str {
    system_prompt
        .strip_prefix("You are ")
        .and_then(|rest| rest.split(',').next())
        .unwrap_or("Someone")
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if system_prompt == JUDGE_SYSTEM_PROMPT {
            return Ok(self.judge_reply.to_string());
        }

        let me = speaker(system_prompt);
        let opponent = match me {
            "Deon" => "Conse",
            "Conse" => "Virtue",
            _ => "Deon",
        };
        let stance = if me == "Conse" { "B" } else { "A" };
        let reply = if user_prompt.contains("Rebuttal round") {
            serde_json::json!({
                "stance": stance,
                "argument": format!("{}, your position overlooks what matters most in this dilemma.", opponent),
            })
        } else {
            serde_json::json!({
                "stance": stance,
                "argument": format!("As {}, I hold to my framework for this case.", me),
            })
        };
        Ok(format!("```json\n{}\n```", reply))
    }

    fn client_type(&self) -> &str {
        "scripted"
    }

    fn endpoint(&self) -> &str {
        "memory://scripted"
    }
}

/// Replies with noise only
struct GarbageClient;

#[async_trait]
impl LlmClient for GarbageClient {
    async fn generate(&self, _: &str, _: &str, _: &GenerationOptions) -> Result<String> {
        Ok("<<< static >>>".to_string())
    }

    fn client_type(&self) -> &str {
        "garbage"
    }

    fn endpoint(&self) -> &str {
        "memory://garbage"
    }
}

fn dilemma() -> Dilemma {
    Dilemma::new("T", "A", "B", "C")
}

#[tokio::test]
async fn test_opening_two_rounds_and_judge() {
    let client = Arc::new(ScriptedClient::new(
        r#"Verdict: {"winner":"Virtue","rationale":"Most balanced.","final_recommendation":"A","confidence":81}"#,
    ));
    let orchestrator = DebateOrchestrator::new(client.clone(), DebateConfig::default());
    let names: Vec<String> = orchestrator.roster().await.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Deon", "Conse", "Virtue"]);

    let mut transcript = Transcript::new(dilemma());
    assert_eq!(transcript.phase(), DebatePhase::Opening);

    let openings = orchestrator.run_opening(&transcript.dilemma).await.unwrap();
    let order: Vec<&str> = openings.iter().map(|t| t.agent.as_str()).collect();
    assert_eq!(order, vec!["Deon", "Conse", "Virtue"]);
    transcript.extend(openings);

    for round in 1..=2 {
        assert_eq!(transcript.phase(), DebatePhase::Rebuttal { round });
        let turns = orchestrator.run_continue(&transcript).await.unwrap();
        assert_eq!(turns.len(), names.len());
        assert!(turns.iter().all(|t| t.round == round && !t.is_fallback));

        let roster: Vec<&str> = names.iter().map(String::as_str).collect();
        assert!(orchestrator.check_rebuttals(&turns, &roster).is_empty());
        transcript.extend(turns);
    }

    assert_eq!(transcript.turns.len(), names.len() + 2 * names.len());
    assert_eq!(transcript.rounds_completed(), 2);

    let verdict = orchestrator.run_judge(&transcript).await.unwrap();
    assert!(names.contains(&verdict.winner));
    assert_eq!(verdict.winner, "Virtue");
    assert_eq!(verdict.final_recommendation, Stance::A);
    assert_eq!(verdict.confidence, 81);
    assert!(!verdict.is_fallback);

    assert_eq!(client.calls.load(Ordering::SeqCst), 3 + 2 * 3 + 1);
}

#[tokio::test]
async fn test_garbage_replies_still_complete_the_debate() {
    let orchestrator = DebateOrchestrator::new(Arc::new(GarbageClient), DebateConfig::default());
    let mut transcript = Transcript::new(dilemma());

    transcript.extend(orchestrator.run_opening(&transcript.dilemma).await.unwrap());
    transcript.extend(orchestrator.run_continue(&transcript).await.unwrap());

    assert_eq!(transcript.turns.len(), 6);
    for turn in &transcript.turns {
        assert_eq!(turn.stance, Stance::A);
        assert!(turn.is_fallback);
        assert_eq!(turn.raw.as_deref(), Some("<<< static >>>"));
    }

    let verdict = orchestrator.run_judge(&transcript).await.unwrap();
    assert_eq!(verdict.winner, "Deon");
    assert_eq!(verdict.final_recommendation, Stance::A);
    assert_eq!(verdict.confidence, 50);
    assert!(verdict.is_fallback);
}

#[tokio::test]
async fn test_custom_persona_debates_after_creation() {
    let store = Arc::new(InMemoryPersonaStore::new());
    let client = Arc::new(ScriptedClient::new(r#"{"winner":"Gaia"}"#));

    let enhancer = PersonaEnhancer::new(client.clone());
    let (persona, _) = enhancer
        .create_persona(
            PersonaDraft::new(
                "Gaia",
                "Puts the long-term health of ecosystems above short-term human convenience.",
            ),
            store.as_ref(),
        )
        .await
        .unwrap();

    let orchestrator =
        DebateOrchestrator::new(client, DebateConfig::default()).with_store(store.clone());
    let mut transcript = Transcript::new(dilemma());
    transcript.extend(orchestrator.run_opening(&transcript.dilemma).await.unwrap());

    assert_eq!(transcript.agents(), vec!["Deon", "Conse", "Virtue", "Gaia"]);
    assert_eq!(
        store.get(&persona.id).await.unwrap().unwrap().usage_count,
        1
    );

    let verdict = orchestrator.run_judge(&transcript).await.unwrap();
    assert_eq!(verdict.winner, "Gaia");
    assert!(verdict.is_fallback);
}
