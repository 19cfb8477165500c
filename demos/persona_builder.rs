//! Custom persona example: score a description, enhance it, store it, rate it
//!
//! Run with: cargo run --example persona_builder
//! Set PERSONA_DB=./personas.db to persist personas with sled.

use chrono::Utc;
use ethos_debate::prelude::*;
use ethos_debate::{AgentRating, SledPersonaStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Ethos Persona Builder ===\n");

    let store: Arc<dyn PersonaStore> = match std::env::var("PERSONA_DB") {
        Ok(path) => {
            println!("✓ Using sled store at {}", path);
            Arc::new(SledPersonaStore::open(path)?)
        }
        Err(_) => Arc::new(InMemoryPersonaStore::new()),
    };

    let client = Arc::new(OllamaClient::from_env()?);
    let enhancer = PersonaEnhancer::new(client);

    let draft = PersonaDraft::new(
        "EcoWarrior",
        "This agent believes environmental protection is the highest moral priority. \
         It evaluates every decision by its long-term impact on ecosystems, for example \
         choosing rail over air travel even when it costs more.",
    )
    .with_avatar("🌱");

    let analysis = enhancer.analyze_description(&draft.description);
    println!("📊 Description scores (overall {:.1}):", analysis.overall_score);
    println!("  - clarity:      {:.1}", analysis.scores.clarity);
    println!("  - completeness: {:.1}", analysis.scores.completeness);
    println!("  - specificity:  {:.1}", analysis.scores.specificity);
    println!("  - consistency:  {:.1}", analysis.scores.consistency);
    for suggestion in &analysis.suggestions {
        println!("  💡 {}", suggestion);
    }

    println!("\n🤖 Enhancing...\n");
    let (persona, enhancement) = enhancer.create_persona(draft, store.as_ref()).await?;

    println!("✅ Created {} {} ({})", persona.avatar, persona.name, persona.id);
    println!("\n📤 System prompt:\n{}\n", persona.system_prompt);
    println!("Improvements:");
    for improvement in &enhancement.improvements_made {
        println!("  - {}", improvement);
    }

    let rating = AgentRating {
        agent_id: persona.id.clone(),
        debate_id: "demo".to_string(),
        user_id: "anonymous".to_string(),
        argument_quality: 4,
        consistency: 5,
        engagement: 4,
        overall_satisfaction: 5,
        comment: Some("Stayed on message.".to_string()),
        created_at: Utc::now(),
    };
    let rated = store.record_rating(&rating).await?;
    println!(
        "\n⭐ Average rating {:.2} over {} rating(s)",
        rated.average_rating, rated.rating_count
    );

    println!("\nStored personas:");
    for stored in store.list().await? {
        println!("  - {} {} (used {} times)", stored.avatar, stored.name, stored.usage_count);
    }

    Ok(())
}
