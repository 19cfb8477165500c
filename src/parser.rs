//! Tolerant parsing of semi-structured model output
//!
//! Model replies are usually JSON but routinely arrive wrapped in code fences,
//! prefixed with commentary, truncated, or with unescaped quotes inside
//! strings. Parsing never fails; it walks four tiers and reports whether it
//! had to fall back:
//!
//! 1. direct JSON parse of the (fence-stripped) text
//! 2. JSON parse of the first balanced `{...}` substring
//! 3. regex salvage of individual fields
//! 4. defaults (`Stance::A`, [`FALLBACK_ARGUMENT`])

use crate::types::Stance;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Argument text used when nothing can be recovered
pub const FALLBACK_ARGUMENT: &str = "—";

static STANCE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i:"?stance"?\s*[:=]\s*"?\s*(?:option\s*)?)([AB])\b"#).expect("valid regex")
});

static OPTION_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i:\boption\s+)([AB])\b"#).expect("valid regex"));

// Ends at a quote followed by another key or a closing brace, or runs to the
// end of truncated text
static ARGUMENT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)"?argument"?\s*:\s*"(.*?)(?:"\s*(?:,\s*"?[A-Za-z_]+"?\s*:|\})|"?\s*$)"#)
        .expect("valid regex")
});

const STRING_FIELD_TEMPLATE: &str = r#"(?is)"?{field}"?\s*:\s*"(.*?)"\s*(?:,\s*"?[A-Za-z_]+"?\s*:|\}|$)"#;

const NUMBER_FIELD_TEMPLATE: &str = r#"(?i)"?{field}"?\s*:\s*"?(\d{1,3})"#;

/// Result of parsing one debate turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTurn {
    /// Recovered stance, `A` when none could be found
    pub stance: Stance,
    /// Recovered argument, [`FALLBACK_ARGUMENT`] when none could be found
    pub argument: String,
    /// Whether any tier below a clean JSON parse was needed to fill the fields
    pub is_fallback: bool,
}

/// Strip surrounding whitespace and a markdown code fence, if present
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) up to the first newline
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Find the first balanced `{...}` substring, ignoring braces inside JSON strings
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Tiers 1 and 2: a JSON object from the whole text or its first balanced substring
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let text = strip_code_fence(raw);
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }
    let candidate = find_json_object(text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// A string field, case-insensitive on the key
pub(crate) fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Regex salvage of a quoted string field that tolerates unescaped quotes
pub(crate) fn salvage_string_field(text: &str, field: &str) -> Option<String> {
    let pattern = STRING_FIELD_TEMPLATE.replace("{field}", &regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(text)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| unescape(value))
}

/// Regex salvage of a small integer field
pub(crate) fn salvage_number_field(text: &str, field: &str) -> Option<u32> {
    let pattern = NUMBER_FIELD_TEMPLATE.replace("{field}", &regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Regex salvage of a stance letter
pub(crate) fn salvage_stance(text: &str) -> Option<Stance> {
    STANCE_FIELD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Stance::parse_loose(m.as_str()))
}

/// A stance named only as "option A"/"option B" in prose, when every mention agrees
fn mentioned_option(text: &str) -> Option<Stance> {
    let mut letters = OPTION_MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());
    let first = letters.next()?;
    if letters.any(|letter| letter != first) {
        return None;
    }
    Stance::parse_loose(first)
}

fn salvage_argument(text: &str) -> Option<String> {
    let body = ARGUMENT_FIELD.captures(text)?.get(1)?.as_str().trim();
    (!body.is_empty()).then(|| unescape(body))
}

fn unescape(s: &str) -> String {
    s.replace("\\\"", "\"").replace("\\n", "\n").replace("\\\\", "\\")
}

/// Parse a `{stance, argument}` debate reply. Never fails.
///
/// A parsed object with a usable stance and a string argument is returned
/// as-is, even when the argument is empty. Regex salvage only runs when no
/// object could be parsed at all.
pub fn parse_turn(raw: &str) -> ParsedTurn {
    if let Some(map) = extract_json_object(raw) {
        let stance = string_field(&map, "stance").and_then(|s| Stance::parse_loose(&s));
        let argument = string_field(&map, "argument");
        let is_fallback = stance.is_none() || argument.is_none();
        if is_fallback {
            tracing::debug!(
                has_stance = stance.is_some(),
                has_argument = argument.is_some(),
                "JSON reply missing fields, using defaults"
            );
        }
        return ParsedTurn {
            stance: stance.unwrap_or_default(),
            argument: argument.unwrap_or_else(|| FALLBACK_ARGUMENT.to_string()),
            is_fallback,
        };
    }

    let text = strip_code_fence(raw);
    let stance = salvage_stance(text).or_else(|| mentioned_option(text));
    let argument = salvage_argument(text).or_else(|| prose_argument(text, stance.is_some()));

    ParsedTurn {
        stance: stance.unwrap_or_default(),
        argument: argument.unwrap_or_else(|| FALLBACK_ARGUMENT.to_string()),
        is_fallback: true,
    }
}

/// Fields recovered from a judge reply; `None` where nothing usable was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedVerdict {
    /// Winner as written by the judge, not yet matched to a debater
    pub winner: Option<String>,
    /// Judge's explanation
    pub rationale: Option<String>,
    /// Recommended option
    pub final_recommendation: Option<Stance>,
    /// Confidence clamped to 0-100
    pub confidence: Option<u8>,
    /// Whether any field was salvaged or missing
    pub is_fallback: bool,
}

fn parse_confidence(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().trim_end_matches('%').trim().parse().ok()?;
    value.is_finite().then(|| value.clamp(0.0, 100.0).round() as u8)
}

/// Parse a `{winner, rationale, final_recommendation, confidence}` judge reply. Never fails.
pub fn parse_verdict(raw: &str) -> ParsedVerdict {
    let non_empty = |s: &String| !s.trim().is_empty();

    if let Some(map) = extract_json_object(raw) {
        let mut verdict = ParsedVerdict {
            winner: string_field(&map, "winner").filter(non_empty),
            rationale: string_field(&map, "rationale").filter(non_empty),
            final_recommendation: string_field(&map, "final_recommendation")
                .and_then(|s| Stance::parse_loose(&s)),
            confidence: string_field(&map, "confidence").and_then(|s| parse_confidence(&s)),
            is_fallback: false,
        };
        verdict.is_fallback = verdict.winner.is_none()
            || verdict.rationale.is_none()
            || verdict.final_recommendation.is_none()
            || verdict.confidence.is_none();
        return verdict;
    }

    let text = strip_code_fence(raw);
    ParsedVerdict {
        winner: salvage_string_field(text, "winner"),
        rationale: salvage_string_field(text, "rationale"),
        final_recommendation: salvage_string_field(text, "final_recommendation")
            .and_then(|s| Stance::parse_loose(&s)),
        confidence: salvage_number_field(text, "confidence").map(|c| c.min(100) as u8),
        is_fallback: true,
    }
}

/// Plain prose with a recognizable stance keeps its text as the argument
fn prose_argument(text: &str, has_stance: bool) -> Option<String> {
    if !has_stance || text.contains('{') {
        return None;
    }
    let body = STANCE_FIELD.replace(text, "");
    let body = body.trim().trim_start_matches([',', '.', ';', '-']).trim();
    (!body.is_empty()).then(|| body.to_string())
}
