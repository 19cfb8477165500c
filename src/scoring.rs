//! Heuristic quality scoring for free-text persona descriptions
//!
//! Four independent axes, each in `[0, 10]`:
//!
//! - **clarity**: average sentence length, best between 10 and 25 words
//! - **completeness**: coverage of five keyword categories
//! - **specificity**: vague filler words versus precision words
//! - **consistency**: co-occurring contradictory terms
//!
//! Matching is plain lowercase substring search over fixed English keyword
//! lists, so `"like"` also fires on `"likely"`.

use serde::{Deserialize, Serialize};

const CLARITY_BAND: (f64, f64) = (10.0, 25.0);
const CLARITY_CENTER: f64 = 17.5;
const CLARITY_DECAY: f64 = 0.3;

const SUGGESTION_THRESHOLD: f64 = 6.0;
const SHORT_DESCRIPTION_WORDS: usize = 30;

const VALUES_TERMS: &[&str] = &["believe", "value", "prioritize", "important", "care about"];
const REASONING_TERMS: &[&str] = &["because", "reason", "logic", "think", "consider"];
const EXAMPLE_TERMS: &[&str] = &["example", "such as", "like", "including", "for instance"];
const PERSONALITY_TERMS: &[&str] = &[
    "compassionate",
    "logical",
    "firm",
    "gentle",
    "strict",
    "flexible",
];
const DECISION_TERMS: &[&str] = &["decision", "choose", "evaluate", "judge", "determine"];

const COMPLETENESS_CATEGORIES: [&[&str]; 5] = [
    VALUES_TERMS,
    REASONING_TERMS,
    EXAMPLE_TERMS,
    PERSONALITY_TERMS,
    DECISION_TERMS,
];

const VAGUE_TERMS: &[&str] = &[
    "good",
    "bad",
    "important",
    "very",
    "really",
    "always",
    "never",
    "everything",
];
const PRECISION_TERMS: &[&str] = &["specific", "particular", "exactly", "precisely", "namely"];

const CONTRADICTIONS: [(&[&str], &[&str]); 3] = [
    (&["always", "never"], &["sometimes", "occasionally"]),
    (&["strict", "rigid"], &["flexible", "adaptable"]),
    (&["emotional", "feeling"], &["logical", "rational"]),
];

/// Scores on the four quality axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScores {
    /// Sentence-length readability
    pub clarity: f64,
    /// Coverage of values, reasoning, examples, personality and decision language
    pub completeness: f64,
    /// Concrete versus vague wording
    pub specificity: f64,
    /// Absence of contradictory traits
    pub consistency: f64,
}

impl AnalysisScores {
    /// Arithmetic mean of the four axes
    pub fn overall(&self) -> f64 {
        (self.clarity + self.completeness + self.specificity + self.consistency) / 4.0
    }
}

/// Scores, suggestions and their mean for a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionAnalysis {
    /// Per-axis scores
    pub scores: AnalysisScores,
    /// Improvement hints
    pub suggestions: Vec<String>,
    /// Mean of the four axes
    pub overall_score: f64,
}

/// Score a description on all four axes
pub fn analyze(description: &str) -> AnalysisScores {
    let lower = description.to_lowercase();
    AnalysisScores {
        clarity: score_clarity(description),
        completeness: score_completeness(&lower),
        specificity: score_specificity(&lower),
        consistency: score_consistency(&lower),
    }
}

/// Score a description and derive suggestions from the result
pub fn analyze_description(description: &str) -> DescriptionAnalysis {
    let scores = analyze(description);
    DescriptionAnalysis {
        suggestions: suggestions(description, &scores),
        overall_score: scores.overall(),
        scores,
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn contains_any(lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| lower.contains(term))
}

fn count_all(lower: &str, terms: &[&str]) -> usize {
    terms.iter().map(|term| lower.matches(term).count()).sum()
}

/// Average words per segment, counting the empty segment after a final terminator
fn score_clarity(description: &str) -> f64 {
    let lengths: Vec<usize> = description.split(['.', '!', '?']).map(word_count).collect();
    let average = lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64;

    let (low, high) = CLARITY_BAND;
    if (low..=high).contains(&average) {
        10.0
    } else {
        (10.0 - (average - CLARITY_CENTER).abs() * CLARITY_DECAY).clamp(0.0, 10.0)
    }
}

fn score_completeness(lower: &str) -> f64 {
    let present = COMPLETENESS_CATEGORIES
        .iter()
        .filter(|terms| contains_any(lower, terms))
        .count();
    present as f64 / COMPLETENESS_CATEGORIES.len() as f64 * 10.0
}

fn score_specificity(lower: &str) -> f64 {
    let words = word_count(lower).max(1) as f64;
    let vague_ratio = count_all(lower, VAGUE_TERMS) as f64 / words;
    let precise_ratio = count_all(lower, PRECISION_TERMS) as f64 / words;
    (10.0 - vague_ratio * 20.0 + precise_ratio * 10.0).clamp(0.0, 10.0)
}

fn score_consistency(lower: &str) -> f64 {
    let contradictions = CONTRADICTIONS
        .iter()
        .filter(|(left, right)| contains_any(lower, left) && contains_any(lower, right))
        .count();
    (10.0 - contradictions as f64 * 2.0).max(0.0)
}

/// Canned improvement hints, ordered completeness, clarity, specificity, consistency, general
pub fn suggestions(description: &str, scores: &AnalysisScores) -> Vec<String> {
    let table: [(f64, [&str; 2]); 4] = [
        (
            scores.completeness,
            [
                "Consider adding specific examples of what this agent would prioritize",
                "Describe how this agent makes decisions or evaluates situations",
            ],
        ),
        (
            scores.clarity,
            [
                "Try using shorter, clearer sentences to describe the agent",
                "Break down complex ideas into simpler statements",
            ],
        ),
        (
            scores.specificity,
            [
                "Replace vague terms like 'good' or 'important' with specific values",
                "Add concrete examples of the agent's beliefs or principles",
            ],
        ),
        (
            scores.consistency,
            [
                "Review for any contradictory statements about the agent's personality",
                "Ensure the agent's values and reasoning style align consistently",
            ],
        ),
    ];

    let mut out: Vec<String> = table
        .iter()
        .filter(|(score, _)| *score < SUGGESTION_THRESHOLD)
        .flat_map(|(_, hints)| hints.iter().map(|hint| hint.to_string()))
        .collect();

    let lower = description.to_lowercase();
    if !lower.contains("reasoning") && !lower.contains("logic") {
        out.push(
            "Describe whether this agent uses logical, emotional, or rule-based reasoning"
                .to_string(),
        );
    }
    if word_count(description) < SHORT_DESCRIPTION_WORDS {
        out.push(
            "Consider expanding the description with more details about the agent's personality"
                .to_string(),
        );
    }
    out
}
