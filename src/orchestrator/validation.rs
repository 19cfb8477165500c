//! Advisory checks on rebuttal turns
//!
//! A rebuttal should name at least one opponent and say something of
//! substance. Failing either check is reported, never enforced.

use super::transcript::Turn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a rebuttal was flagged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// No other debater's name appears in the argument
    NoOpponentMentioned,
    /// Argument is at or below the minimum length
    TooShort {
        /// Length of the argument in characters
        chars: usize,
    },
}

/// A non-fatal problem with one rebuttal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Agent whose turn was flagged
    pub agent: String,
    /// Rebuttal round
    pub round: u32,
    /// Problems found, in check order
    pub kinds: Vec<WarningKind>,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self
            .kinds
            .iter()
            .map(|kind| match kind {
                WarningKind::NoOpponentMentioned => "no opponent mentioned".to_string(),
                WarningKind::TooShort { chars } => format!("too short ({} chars)", chars),
            })
            .collect();
        write!(
            f,
            "{} failed validation in round {}: {}",
            self.agent,
            self.round,
            reasons.join(", ")
        )
    }
}

/// Check a rebuttal against the debaters' names
pub fn validate_rebuttal(
    turn: &Turn,
    roster: &[&str],
    min_chars: usize,
) -> Option<ValidationWarning> {
    let text = turn.argument.to_lowercase();
    let speaker = turn.agent.to_lowercase();
    let mut kinds = Vec::new();

    let names_opponent = roster
        .iter()
        .map(|name| name.to_lowercase())
        .any(|name| name != speaker && text.contains(&name));
    if !names_opponent {
        kinds.push(WarningKind::NoOpponentMentioned);
    }

    let chars = turn.argument.chars().count();
    if chars <= min_chars {
        kinds.push(WarningKind::TooShort { chars });
    }

    (!kinds.is_empty()).then(|| ValidationWarning {
        agent: turn.agent.clone(),
        round: turn.round,
        kinds,
    })
}
