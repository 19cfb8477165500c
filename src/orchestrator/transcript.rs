//! Debate state carried by the caller between orchestrator calls

use crate::parser::{ParsedTurn, FALLBACK_ARGUMENT};
use crate::types::Stance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A two-option ethical dilemma
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dilemma {
    /// Short title
    pub title: String,
    /// First option
    #[serde(rename = "A", alias = "optionA", alias = "option_a")]
    pub option_a: String,
    /// Second option
    #[serde(rename = "B", alias = "optionB", alias = "option_b")]
    pub option_b: String,
    /// Facts and constraints both options must respect
    #[serde(default)]
    pub constraints: String,
}

impl Dilemma {
    /// Create a dilemma
    pub fn new(
        title: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
        constraints: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            option_a: option_a.into(),
            option_b: option_b.into(),
            constraints: constraints.into(),
        }
    }
}

/// One agent's contribution to one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Display name of the speaking agent
    pub agent: String,
    /// Option the agent argues for
    pub stance: Stance,
    /// Argument text
    pub argument: String,
    /// 0 for openings, 1.. for rebuttal rounds
    #[serde(default)]
    pub round: u32,
    /// Whether the reply needed repair or the call failed
    #[serde(default)]
    pub is_fallback: bool,
    /// Raw model output, kept only for fallback turns
    #[serde(rename = "_raw", default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Turn {
    /// Build a turn from a parsed reply
    pub fn from_parsed(agent: impl Into<String>, round: u32, parsed: ParsedTurn) -> Self {
        Self {
            agent: agent.into(),
            stance: parsed.stance,
            argument: parsed.argument,
            round,
            is_fallback: parsed.is_fallback,
            raw: None,
        }
    }

    /// Placeholder turn for a failed generation call
    pub fn failed(agent: impl Into<String>, round: u32) -> Self {
        Self {
            agent: agent.into(),
            stance: Stance::default(),
            argument: FALLBACK_ARGUMENT.to_string(),
            round,
            is_fallback: true,
            raw: None,
        }
    }

    /// Attach the raw model output
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// Where a debate stands, derived from its transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DebatePhase {
    /// No turns yet
    Opening,
    /// Next rebuttal round to run
    Rebuttal {
        /// 1-based round number
        round: u32,
    },
}

impl fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opening => f.write_str("opening"),
            Self::Rebuttal { round } => write!(f, "rebuttal {}", round),
        }
    }
}

/// Dilemma plus every turn so far, in chronological order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// The dilemma under debate
    pub dilemma: Dilemma,
    /// Turns in the order they were produced
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Transcript {
    /// Start an empty transcript
    pub fn new(dilemma: Dilemma) -> Self {
        Self {
            dilemma,
            turns: Vec::new(),
        }
    }

    /// Append a phase's turns
    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
    }

    /// Agent names in order of first appearance
    pub fn agents(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for turn in &self.turns {
            if !seen.contains(&turn.agent.as_str()) {
                seen.push(&turn.agent);
            }
        }
        seen
    }

    /// Highest rebuttal round present (0 when only openings exist)
    pub fn rounds_completed(&self) -> u32 {
        self.turns.iter().map(|t| t.round).max().unwrap_or(0)
    }

    /// The next phase this transcript can be advanced with
    pub fn phase(&self) -> DebatePhase {
        if self.turns.is_empty() {
            DebatePhase::Opening
        } else {
            DebatePhase::Rebuttal {
                round: self.rounds_completed() + 1,
            }
        }
    }

    /// Each agent's most recent stance, in roster order
    pub fn latest_stances(&self) -> Vec<(&str, Stance)> {
        self.agents()
            .into_iter()
            .filter_map(|agent| {
                self.turns
                    .iter()
                    .rev()
                    .find(|t| t.agent == agent)
                    .map(|t| (agent, t.stance))
            })
            .collect()
    }
}

/// The judge's decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Name of the winning agent, always one of the debaters
    pub winner: String,
    /// Judge's explanation
    pub rationale: String,
    /// Option the judge recommends
    pub final_recommendation: Stance,
    /// 0-100
    pub confidence: u8,
    /// Whether any field had to be salvaged or defaulted
    #[serde(default)]
    pub is_fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(agent: &str, stance: Stance, round: u32) -> Turn {
        Turn {
            agent: agent.to_string(),
            stance,
            argument: "because".to_string(),
            round,
            is_fallback: false,
            raw: None,
        }
    }

    #[test]
    fn test_dilemma_accepts_wire_aliases() {
        let short: Dilemma =
            serde_json::from_str(r#"{"title":"T","A":"a","B":"b","constraints":"C"}"#).unwrap();
        let camel: Dilemma =
            serde_json::from_str(r#"{"title":"T","optionA":"a","optionB":"b","constraints":"C"}"#)
                .unwrap();
        assert_eq!(short, camel);
        assert_eq!(short, Dilemma::new("T", "a", "b", "C"));
    }

    #[test]
    fn test_turn_wire_shape() {
        let minimal: Turn =
            serde_json::from_str(r#"{"agent":"Deon","stance":"B","argument":"x"}"#).unwrap();
        assert_eq!(minimal.round, 0);
        assert!(!minimal.is_fallback);

        let json = serde_json::to_value(&minimal).unwrap();
        assert!(json.get("_raw").is_none());

        let json = serde_json::to_value(Turn::failed("Conse", 1).with_raw("oops")).unwrap();
        assert_eq!(json["_raw"], "oops");
        assert_eq!(json["argument"], FALLBACK_ARGUMENT);
    }

    #[test]
    fn test_phase_and_rounds() {
        let mut transcript = Transcript::new(Dilemma::new("T", "A", "B", "C"));
        assert_eq!(transcript.phase(), DebatePhase::Opening);

        transcript.extend([turn("Deon", Stance::A, 0), turn("Conse", Stance::B, 0)]);
        assert_eq!(transcript.rounds_completed(), 0);
        assert_eq!(transcript.phase(), DebatePhase::Rebuttal { round: 1 });

        transcript.extend([turn("Deon", Stance::B, 1), turn("Conse", Stance::B, 1)]);
        assert_eq!(transcript.phase(), DebatePhase::Rebuttal { round: 2 });
        assert_eq!(transcript.phase().to_string(), "rebuttal 2");
    }

    #[test]
    fn test_agents_and_latest_stances() {
        let mut transcript = Transcript::new(Dilemma::new("T", "A", "B", "C"));
        transcript.extend([
            turn("Virtue", Stance::A, 0),
            turn("Deon", Stance::A, 0),
            turn("Virtue", Stance::B, 1),
        ]);
        assert_eq!(transcript.agents(), vec!["Virtue", "Deon"]);
        assert_eq!(
            transcript.latest_stances(),
            vec![("Virtue", Stance::B), ("Deon", Stance::A)]
        );
    }
}
