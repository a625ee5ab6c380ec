//! Lenient parsing of oracle responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;
/// Score substituted for failed or malformed oracle responses.
pub const NEUTRAL_SCORE: u8 = 5;

/// Scores at or above this count as productive.
const PRODUCTIVE_FROM: u8 = 7;
/// Scores below this count as distracted.
const BORDERLINE_FROM: u8 = 4;

/// Score and explanation for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub score: u8,
    pub reason: String,
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            reason: String::new(),
        }
    }
}

impl Verdict {
    /// Parse a raw oracle response.
    ///
    /// Accepts a JSON object, optionally wrapped in a Markdown code fence.
    /// A missing or non-numeric `score` becomes the neutral score, numeric
    /// scores are clamped into 1..=10, and a missing `reason` is empty.
    pub fn parse(raw: &str) -> Self {
        let body = strip_code_fence(raw);
        let value: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "oracle response is not JSON");
                return Self::default();
            }
        };

        let score = value
            .get("score")
            .and_then(score_from_value)
            .unwrap_or(NEUTRAL_SCORE);
        let reason = value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { score, reason }
    }
}

fn score_from_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(number.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8)
}

/// Remove a surrounding ``` fence (with optional `json` tag).
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = rest.split("```").next().unwrap_or(rest);
    let inner = inner.trim_start();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Presentation band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusLevel {
    Productive,
    Borderline,
    Distracted,
}

impl FocusLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= PRODUCTIVE_FROM {
            FocusLevel::Productive
        } else if score >= BORDERLINE_FROM {
            FocusLevel::Borderline
        } else {
            FocusLevel::Distracted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let v = Verdict::parse(r#"{"score": 7, "reason": "Reading docs", "is_productive": true}"#);
        assert_eq!(v.score, 7);
        assert_eq!(v.reason, "Reading docs");
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"score\": 3, \"reason\": \"Watching videos\"}\n```";
        assert_eq!(Verdict::parse(raw).score, 3);
        let raw = "```\n{\"score\": 9}\n```";
        assert_eq!(Verdict::parse(raw).score, 9);
    }

    #[test]
    fn malformed_responses_fall_back_to_neutral() {
        assert_eq!(Verdict::parse("I think they are working"), Verdict::default());
        assert_eq!(Verdict::parse(""), Verdict::default());
        assert_eq!(Verdict::parse(r#"{"reason": "no score"}"#).score, NEUTRAL_SCORE);
        assert_eq!(Verdict::parse(r#"{"score": "high"}"#).score, NEUTRAL_SCORE);
        assert_eq!(Verdict::parse(r#"{"score": 6.5}"#).score, NEUTRAL_SCORE);
        assert_eq!(Verdict::parse("[1, 2]").score, NEUTRAL_SCORE);
    }

    #[test]
    fn numeric_variants_are_accepted_and_clamped() {
        assert_eq!(Verdict::parse(r#"{"score": "8"}"#).score, 8);
        assert_eq!(Verdict::parse(r#"{"score": 4.0}"#).score, 4);
        assert_eq!(Verdict::parse(r#"{"score": 42}"#).score, 10);
        assert_eq!(Verdict::parse(r#"{"score": -3}"#).score, 1);
    }

    #[test]
    fn focus_bands() {
        assert_eq!(FocusLevel::from_score(10), FocusLevel::Productive);
        assert_eq!(FocusLevel::from_score(7), FocusLevel::Productive);
        assert_eq!(FocusLevel::from_score(6), FocusLevel::Borderline);
        assert_eq!(FocusLevel::from_score(4), FocusLevel::Borderline);
        assert_eq!(FocusLevel::from_score(3), FocusLevel::Distracted);
        assert_eq!(FocusLevel::from_score(1), FocusLevel::Distracted);
    }
}
