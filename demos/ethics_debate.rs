//! Full debate example: openings, two rebuttal rounds, and a verdict
//!
//! Run with: cargo run --example ethics_debate
//! Optional: DEBATE_CONFIG=debate.yaml, OLLAMA_BASE_URL, OLLAMA_MODEL, OLLAMA_API_KEY

use ethos_debate::prelude::*;
use ethos_debate::orchestrator::validate_rebuttal;
use ethos_debate::{init_tracing, TelemetryConfig};
use std::sync::Arc;

const ROUNDS: u32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&TelemetryConfig::default())?;

    println!("=== Ethos Debate Example ===\n");

    let client = OllamaClient::from_env()?;
    println!("✓ Ollama client initialized ({})", client.endpoint());

    let config = match std::env::var("DEBATE_CONFIG") {
        Ok(path) => DebateConfig::from_file(path)?,
        Err(_) => DebateConfig::default(),
    };
    let orchestrator = DebateOrchestrator::new(Arc::new(client), config);

    let mut transcript = Transcript::new(Dilemma::new(
        "Academic Integrity vs Compassion",
        "Decline to write the student's paper; offer resources and planning help.",
        "Quietly write the paper to help them pass due to exceptional hardship.",
        "Family emergency; deadline tonight; honor code exists; failure risks scholarship.",
    ));

    println!("\n--- Openings ---");
    let openings = orchestrator.run_opening(&transcript.dilemma).await?;
    print_turns(&openings);
    transcript.extend(openings);

    for _ in 0..ROUNDS {
        let round = transcript.rounds_completed() + 1;
        println!("\n--- Rebuttal round {} ---", round);
        let turns = orchestrator.run_continue(&transcript).await?;
        print_turns(&turns);

        let roster = transcript.agents();
        for turn in &turns {
            if let Some(warning) =
                validate_rebuttal(turn, &roster, orchestrator.config().min_rebuttal_chars)
            {
                println!("⚠️  {}", warning);
            }
        }
        transcript.extend(turns);
    }

    println!("\n--- Verdict ---");
    let verdict = orchestrator.run_judge(&transcript).await?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    Ok(())
}

fn print_turns(turns: &[Turn]) {
    for turn in turns {
        let marker = if turn.is_fallback { " (fallback)" } else { "" };
        println!("\n[{}] stance={}{}", turn.agent, turn.stance, marker);
        println!("{}", turn.argument);
    }
}
