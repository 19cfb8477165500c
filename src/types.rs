//! Core type definitions shared across the debate engine

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a debate persona.
///
/// Fixed personas use their lowercase name (`deon`, `conse`, `virtue`);
/// custom personas get a random UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Create an agent ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh random ID for a custom persona
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Which of the dilemma's two options an agent argues for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    /// Option A (also the default when no stance can be recovered)
    #[default]
    A,
    /// Option B
    B,
}

impl Stance {
    /// Normalize a model-provided stance token.
    ///
    /// Accepts `a`, `B`, `"Option A"`, `"B)"` and similar; anything else is `None`.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let token = raw.trim().trim_matches(|c: char| !c.is_ascii_alphanumeric());
        let token = token
            .strip_prefix("option")
            .or_else(|| token.strip_prefix("Option"))
            .or_else(|| token.strip_prefix("OPTION"))
            .unwrap_or(token)
            .trim();
        match token {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            _ => None,
        }
    }

    /// The letter as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stance_parse_loose() {
        assert_eq!(Stance::parse_loose("A"), Some(Stance::A));
        assert_eq!(Stance::parse_loose(" b "), Some(Stance::B));
        assert_eq!(Stance::parse_loose("Option B"), Some(Stance::B));
        assert_eq!(Stance::parse_loose("(A)"), Some(Stance::A));
        assert_eq!(Stance::parse_loose("maybe"), None);
        assert_eq!(Stance::parse_loose(""), None);
    }

    #[test]
    fn test_stance_wire_format() {
        assert_eq!(serde_json::to_string(&Stance::B).unwrap(), "\"B\"");
        let stance: Stance = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(stance, Stance::A);
    }

    #[test]
    fn test_agent_id_transparent() {
        let id = AgentId::new("deon");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"deon\"");
        assert_ne!(AgentId::random(), AgentId::random());
    }
}
