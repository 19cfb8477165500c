//! Persona enhancement: rewrite a user's free-text description into a debate system prompt

use crate::config::GenerationOptions;
use crate::error::{Error, Result};
use crate::llm_client::LlmClient;
use crate::persona::{CustomPersona, PersonaDraft, JSON_MARKER};
use crate::scoring::{self, AnalysisScores, DescriptionAnalysis};
use crate::store::{ensure_unique_name, PersonaStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Instruction given to the generator for every enhancement
pub const ENHANCER_SYSTEM_PROMPT: &str = "You are an expert at creating ethical AI agent \
personalities. Your job is to take a user's description of an ethical agent and enhance it into \
a professional system prompt that will work well for ethical debates. \n\n\
Guidelines for enhancement:\n\
- Keep the user's core intent and values\n\
- Add clear reasoning framework (deontological, consequentialist, virtue ethics, or custom)\n\
- Specify decision-making criteria and examples\n\
- Define personality traits that affect argumentation style\n\
- Ensure the agent can participate in structured debates\n\
- Make it specific enough to be consistent across different scenarios\n\
- End with 'Respond in compact JSON only.' for debate compatibility\n\n\
Return only the enhanced system prompt, nothing else.";

const FALLBACK_IMPROVEMENTS: [&str; 3] = [
    "Added structured reasoning approach",
    "Ensured debate system compatibility",
    "Enhanced consistency guidelines",
];

const FRAMEWORK_TERMS: [&str; 4] = ["deontological", "consequentialist", "virtue", "utilitarian"];

/// Outcome of one enhancement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementResult {
    /// Description as submitted
    pub original_description: String,
    /// Rewritten system prompt, always ending in the JSON marker
    pub enhanced_prompt: String,
    /// What the rewrite added, in checklist order
    pub improvements_made: Vec<String>,
    /// Scores of the original description
    pub analysis_scores: AnalysisScores,
    /// Suggestions for the original description
    pub suggestions: Vec<String>,
}

/// Rewrites persona descriptions through the generation service
pub struct PersonaEnhancer {
    client: Arc<dyn LlmClient>,
    options: GenerationOptions,
    call_timeout: Duration,
}

impl PersonaEnhancer {
    /// Create an enhancer with the default options (400 tokens, temperature 0.7)
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            options: GenerationOptions::new(400, 0.7),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the per-call deadline (default 120s)
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Override the generation options
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Score a description without calling the generator
    pub fn analyze_description(&self, description: &str) -> DescriptionAnalysis {
        scoring::analyze_description(description)
    }

    /// Enhance a description.
    ///
    /// Generation failures never surface: the result then carries a
    /// deterministic template rewrite alongside the real scores.
    pub async fn enhance(&self, description: &str) -> EnhancementResult {
        let scores = scoring::analyze(description);
        let suggestions = scoring::suggestions(description, &scores);

        match self.generate(description).await {
            Ok(enhanced_prompt) => EnhancementResult {
                improvements_made: identify_improvements(description, &enhanced_prompt),
                original_description: description.to_string(),
                enhanced_prompt,
                analysis_scores: scores,
                suggestions,
            },
            Err(e) => {
                tracing::warn!(client = self.client.client_type(), "enhancement failed, using template: {}", e);
                fallback_enhancement(description, scores, suggestions)
            }
        }
    }

    async fn generate(&self, description: &str) -> Result<String> {
        let request = enhancement_request(description);
        let call = self
            .client
            .generate(ENHANCER_SYSTEM_PROMPT, &request, &self.options);
        let raw = tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                Error::timeout(format!(
                    "enhancement exceeded {}s",
                    self.call_timeout.as_secs_f64()
                ))
            })??;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::service("empty enhancement response"));
        }
        Ok(ensure_json_marker(trimmed))
    }

    /// Validate a draft, enhance it, and persist the resulting persona.
    ///
    /// Names must be unique among stored personas, ignoring case.
    pub async fn create_persona(
        &self,
        draft: PersonaDraft,
        store: &dyn PersonaStore,
    ) -> Result<(CustomPersona, EnhancementResult)> {
        draft.validate()?;
        ensure_unique_name(store, &draft.name, None).await?;
        let enhancement = self.enhance(&draft.description).await;
        let persona = CustomPersona::from_draft(draft, enhancement.enhanced_prompt.clone());
        store.put(persona.clone()).await?;
        tracing::info!(id = %persona.id, name = %persona.name, "custom persona created");
        Ok((persona, enhancement))
    }
}

fn enhancement_request(description: &str) -> String {
    format!(
        "Original user description: \"{}\"\n\n\
         Please enhance this into a professional system prompt for an ethical debate agent. \
         The agent should maintain the user's core values while being more specific about \
         reasoning style, decision-making criteria, and personality traits.",
        description
    )
}

/// Append the JSON marker unless the text already ends with it
pub fn ensure_json_marker(text: &str) -> String {
    if text.ends_with(JSON_MARKER) {
        text.to_string()
    } else {
        format!("{} {}", text, JSON_MARKER)
    }
}

/// Compare original and enhanced text against a fixed checklist
pub fn identify_improvements(original: &str, enhanced: &str) -> Vec<String> {
    let original_lower = original.to_lowercase();
    let enhanced_lower = enhanced.to_lowercase();
    let mut improvements = Vec::new();

    if !original_lower.contains("reasoning")
        && ["reasoning", "framework", "approach"]
            .iter()
            .any(|w| enhanced_lower.contains(w))
    {
        improvements.push("Added clear reasoning framework");
    }
    if !original_lower.contains("decision") && enhanced_lower.contains("decision") {
        improvements.push("Specified decision-making criteria");
    }
    let original_words = original.split_whitespace().count() as f64;
    let enhanced_words = enhanced.split_whitespace().count() as f64;
    if enhanced_words > original_words * 1.5 {
        improvements.push("Expanded personality description and behavioral patterns");
    }
    if !original_lower.contains("example") && enhanced_lower.contains("example") {
        improvements.push("Added specific examples and applications");
    }
    if FRAMEWORK_TERMS.iter().any(|w| enhanced_lower.contains(w)) {
        improvements.push("Connected to established ethical framework");
    }
    if enhanced_lower.contains("json") {
        improvements.push("Ensured compatibility with debate system format");
    }

    if improvements.is_empty() {
        improvements.push("Enhanced clarity and specificity");
    }
    improvements.into_iter().map(String::from).collect()
}

/// Deterministic template rewrite used when generation is unavailable
pub fn fallback_enhancement(
    description: &str,
    scores: AnalysisScores,
    suggestions: Vec<String>,
) -> EnhancementResult {
    let enhanced_prompt = format!(
        "You are an ethical agent based on the following principles: {} \
         When evaluating ethical dilemmas, you apply your core values consistently and \
         provide clear reasoning for your positions. You engage respectfully with other \
         perspectives while maintaining your ethical stance. {}",
        description, JSON_MARKER
    );

    EnhancementResult {
        original_description: description.to_string(),
        enhanced_prompt,
        improvements_made: FALLBACK_IMPROVEMENTS.iter().map(|s| s.to_string()).collect(),
        analysis_scores: scores,
        suggestions,
    }
}
