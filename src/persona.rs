//! Debate personas: the fixed ethical-framework trio and user-defined custom personas

use crate::error::{Error, Result};
use crate::types::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Trailing instruction every debate system prompt must carry
pub const JSON_MARKER: &str = "Respond in compact JSON only.";

/// Instruction that makes rebuttals name their target
pub const ADDRESS_OPPONENTS: &str =
    "When responding to opponents, ALWAYS start with their name followed by a comma.";

const NAME_MAX_CHARS: usize = 50;
const DESCRIPTION_MIN_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 1000;
const COMMENT_MAX_CHARS: usize = 500;

/// A persona that can take part in a debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier
    pub id: AgentId,
    /// Display name, also the label used in transcripts
    pub name: String,
    /// Avatar glyph
    pub avatar: String,
    /// System prompt sent with every generation call
    pub system_prompt: String,
    /// Short human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Metadata about one of the built-in personas
#[derive(Debug, Clone, Copy)]
pub struct FixedPersona {
    /// Lowercase identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Ethical framework the persona represents
    pub role: &'static str,
    /// Avatar glyph
    pub avatar: &'static str,
    /// One-paragraph description
    pub description: &'static str,
    /// One-line philosophy
    pub philosophy: &'static str,
    /// System prompt
    pub system_prompt: &'static str,
}

impl FixedPersona {
    /// Convert to a roster entry
    pub fn to_persona(&self) -> Persona {
        Persona {
            id: AgentId::new(self.id),
            name: self.name.to_string(),
            avatar: self.avatar.to_string(),
            system_prompt: self.system_prompt.to_string(),
            description: Some(self.description.to_string()),
        }
    }
}

/// The built-in personas, in debate order
pub const FIXED_PERSONAS: [FixedPersona; 3] = [
    FixedPersona {
        id: "deon",
        name: "Deon",
        role: "Deontologist",
        avatar: "⚖",
        description: "Believes moral worth comes from following principles, duties, and rights. \
                      Prioritizes integrity, consent, fairness, and respect for universal rules.",
        philosophy: "Actions are right or wrong based on adherence to moral rules, regardless of consequences.",
        system_prompt: "You are Deon, a deontologist who believes moral worth comes from following \
                        principles, duties, and rights. You prioritize integrity, consent, fairness, \
                        and respect for universal rules. If breaking a rule leads to good outcomes, \
                        you still refuse because morality must be consistent. You often cite moral \
                        laws, rights, or obligations. When responding to opponents, ALWAYS start with \
                        their name followed by a comma. Respond in compact JSON only.",
    },
    FixedPersona {
        id: "conse",
        name: "Conse",
        role: "Consequentialist",
        avatar: "◆",
        description: "Evaluates actions purely by their outcomes. Rules are heuristics, not absolutes. \
                      Focuses on maximizing overall well-being.",
        philosophy: "The ends justify the means - actions are right if they produce the best overall consequences.",
        system_prompt: "You are Conse, a consequentialist who judges every action purely by its \
                        outcomes. Rules are useful heuristics, not absolutes, and you set them aside \
                        when breaking them produces more overall well-being. You weigh benefits and \
                        harms for everyone affected and often cite concrete consequences, probabilities, \
                        and trade-offs. When responding to opponents, ALWAYS start with their name \
                        followed by a comma. Respond in compact JSON only.",
    },
    FixedPersona {
        id: "virtue",
        name: "Virtue",
        role: "Virtue Ethicist",
        avatar: "✦",
        description: "Focuses on character and human flourishing rather than strict rules or outcomes. \
                      Emphasizes virtues like honesty, compassion, and wisdom.",
        philosophy: "What would a virtuous person do? Character and moral excellence guide ethical decisions.",
        system_prompt: "You are Virtue, a virtue ethicist who asks what a person of good character \
                        would do. You focus on human flourishing rather than strict rules or \
                        calculated outcomes, and you emphasize honesty, compassion, courage, and \
                        practical wisdom. You often cite the kind of person an action would make \
                        someone become. When responding to opponents, ALWAYS start with their name \
                        followed by a comma. Respond in compact JSON only.",
    },
];

static FIXED_ROSTER: LazyLock<Vec<Persona>> =
    LazyLock::new(|| FIXED_PERSONAS.iter().map(FixedPersona::to_persona).collect());

/// The fixed personas as roster entries, in debate order
pub fn fixed_personas() -> &'static [Persona] {
    &FIXED_ROSTER
}

/// Look up a fixed persona by id or name (case-insensitive)
pub fn fixed_persona(key: &str) -> Option<&'static Persona> {
    fixed_personas()
        .iter()
        .find(|p| p.id.as_str().eq_ignore_ascii_case(key) || p.name.eq_ignore_ascii_case(key))
}

/// Wrap an enhanced description into the final debate system prompt
pub fn format_system_prompt(enhanced_prompt: &str, agent_name: &str) -> String {
    format!(
        "You are {}, an ethical agent. {} {} {}",
        agent_name,
        enhanced_prompt.trim(),
        ADDRESS_OPPONENTS,
        JSON_MARKER
    )
}

/// User input for creating a custom persona
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDraft {
    /// Display name (1-50 characters)
    pub name: String,
    /// Avatar glyph
    #[serde(default = "default_avatar")]
    pub avatar: String,
    /// Free-text description (50-1000 characters)
    pub description: String,
}

fn default_avatar() -> String {
    "🤖".to_string()
}

impl PersonaDraft {
    /// Create a draft with the default avatar
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: default_avatar(),
            description: description.into(),
        }
    }

    /// Set the avatar
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// Check field lengths
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_description(&self.description)
    }
}

/// Partial update of a custom persona
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaUpdate {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New avatar
    #[serde(default)]
    pub avatar: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
}

fn validate_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > NAME_MAX_CHARS {
        return Err(Error::invalid_input(format!(
            "name must be 1-{} characters, got {}",
            NAME_MAX_CHARS, len
        )));
    }
    if fixed_persona(name).is_some() {
        return Err(Error::invalid_input(format!(
            "name {} is reserved for a built-in persona",
            name
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
        return Err(Error::invalid_input(format!(
            "description must be {}-{} characters, got {}",
            DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS, len
        )));
    }
    Ok(())
}

/// A user-defined persona with its usage and rating counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPersona {
    /// Unique identifier
    pub id: AgentId,
    /// Display name
    pub name: String,
    /// Avatar glyph
    pub avatar: String,
    /// Original user description
    pub description: String,
    /// Enhanced description produced by the enhancer
    pub enhanced_prompt: String,
    /// Final debate system prompt
    pub system_prompt: String,
    /// Creator label
    pub created_by: String,
    /// Creation time, defines roster order
    pub created_at: DateTime<Utc>,
    /// Whether other users can pick this persona
    pub is_public: bool,
    /// Number of debates the persona took part in
    pub usage_count: u64,
    /// Running mean of submitted ratings (0.0 when unrated)
    pub average_rating: f64,
    /// Number of ratings folded into the mean
    pub rating_count: u64,
}

impl CustomPersona {
    /// Build a persona from a validated draft and its enhanced prompt
    pub fn from_draft(draft: PersonaDraft, enhanced_prompt: impl Into<String>) -> Self {
        let enhanced_prompt = enhanced_prompt.into();
        let system_prompt = format_system_prompt(&enhanced_prompt, &draft.name);
        Self {
            id: AgentId::random(),
            name: draft.name,
            avatar: draft.avatar,
            description: draft.description,
            enhanced_prompt,
            system_prompt,
            created_by: "user".to_string(),
            created_at: Utc::now(),
            is_public: true,
            usage_count: 0,
            average_rating: 0.0,
            rating_count: 0,
        }
    }

    /// Roster entry for this persona
    pub fn to_persona(&self) -> Persona {
        Persona {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            system_prompt: self.system_prompt.clone(),
            description: Some(self.description.clone()),
        }
    }

    /// Apply a partial update.
    ///
    /// Renaming regenerates the system prompt; a new description is stored
    /// as-is and only takes effect once the caller re-enhances it. Name
    /// uniqueness needs the store; see [`crate::store::update_persona`].
    pub fn apply_update(&mut self, update: PersonaUpdate) -> Result<()> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(description) = &update.description {
            validate_description(description)?;
        }

        if let Some(name) = update.name {
            self.system_prompt = format_system_prompt(&self.enhanced_prompt, &name);
            self.name = name;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        Ok(())
    }

    /// Fold a rating into the running average
    pub fn apply_rating(&mut self, rating: &AgentRating) -> Result<()> {
        rating.validate()?;
        let total = self.average_rating * self.rating_count as f64 + rating.score();
        self.rating_count += 1;
        self.average_rating = total / self.rating_count as f64;
        Ok(())
    }
}

/// A user's rating of a persona's performance in one debate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRating {
    /// Rated persona
    pub agent_id: AgentId,
    /// Debate the rating refers to
    pub debate_id: String,
    /// Rating author
    #[serde(default = "default_user")]
    pub user_id: String,
    /// 1-5
    pub argument_quality: u8,
    /// 1-5
    pub consistency: u8,
    /// 1-5
    pub engagement: u8,
    /// 1-5
    pub overall_satisfaction: u8,
    /// Free-text comment (max 500 characters)
    #[serde(default)]
    pub comment: Option<String>,
    /// Submission time
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
}

fn default_user() -> String {
    "anonymous".to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

impl AgentRating {
    /// Mean of the four rating axes
    pub fn score(&self) -> f64 {
        let sum = self.argument_quality as f64
            + self.consistency as f64
            + self.engagement as f64
            + self.overall_satisfaction as f64;
        sum / 4.0
    }

    /// Check axis ranges and comment length
    pub fn validate(&self) -> Result<()> {
        let axes = [
            ("argument_quality", self.argument_quality),
            ("consistency", self.consistency),
            ("engagement", self.engagement),
            ("overall_satisfaction", self.overall_satisfaction),
        ];
        for (axis, value) in axes {
            if !(1..=5).contains(&value) {
                return Err(Error::invalid_input(format!(
                    "{} must be between 1 and 5, got {}",
                    axis, value
                )));
            }
        }
        if let Some(comment) = &self.comment {
            if comment.chars().count() > COMMENT_MAX_CHARS {
                return Err(Error::invalid_input("comment exceeds 500 characters"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = "This agent believes environmental protection is the highest moral \
                               priority and uses scientific evidence to make decisions.";

    fn rating(value: u8) -> AgentRating {
        AgentRating {
            agent_id: AgentId::new("x"),
            debate_id: "debate-1".to_string(),
            user_id: default_user(),
            argument_quality: value,
            consistency: value,
            engagement: value,
            overall_satisfaction: value,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fixed_roster_order() {
        let names: Vec<_> = fixed_personas().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Deon", "Conse", "Virtue"]);
        for persona in fixed_personas() {
            assert!(persona.system_prompt.ends_with(JSON_MARKER));
            assert!(persona.system_prompt.contains(ADDRESS_OPPONENTS));
        }
    }

    #[test]
    fn test_fixed_persona_lookup() {
        assert_eq!(fixed_persona("conse").unwrap().name, "Conse");
        assert_eq!(fixed_persona("VIRTUE").unwrap().id.as_str(), "virtue");
        assert!(fixed_persona("judge").is_none());
    }

    #[test]
    fn test_format_system_prompt() {
        let prompt = format_system_prompt("  Cares about animals.  ", "Paws");
        assert_eq!(
            prompt,
            "You are Paws, an ethical agent. Cares about animals. When responding to opponents, \
             ALWAYS start with their name followed by a comma. Respond in compact JSON only."
        );
    }

    #[test]
    fn test_draft_validation() {
        assert!(PersonaDraft::new("EcoWarrior", DESCRIPTION).validate().is_ok());
        assert!(PersonaDraft::new("", DESCRIPTION).validate().is_err());
        assert!(PersonaDraft::new("x".repeat(51), DESCRIPTION).validate().is_err());
        assert!(PersonaDraft::new("Short", "too short").validate().is_err());
        assert!(PersonaDraft::new("Deon", DESCRIPTION).validate().is_err());
    }

    #[test]
    fn test_rename_regenerates_system_prompt() {
        let mut persona = CustomPersona::from_draft(
            PersonaDraft::new("EcoWarrior", DESCRIPTION),
            "Protects the planet.",
        );
        persona
            .apply_update(PersonaUpdate {
                name: Some("Gaia".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(persona.name, "Gaia");
        assert!(persona.system_prompt.starts_with("You are Gaia, an ethical agent."));
    }

    #[test]
    fn test_rating_running_average() {
        let mut persona =
            CustomPersona::from_draft(PersonaDraft::new("EcoWarrior", DESCRIPTION), "x");
        persona.apply_rating(&rating(5)).unwrap();
        persona.apply_rating(&rating(3)).unwrap();
        assert_eq!(persona.rating_count, 2);
        assert!((persona.average_rating - 4.0).abs() < f64::EPSILON);

        assert!(persona.apply_rating(&rating(6)).is_err());
        assert_eq!(persona.rating_count, 2);
    }
}
