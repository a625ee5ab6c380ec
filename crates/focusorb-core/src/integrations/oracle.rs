//! Offline productivity oracle.
//!
//! Scores a snapshot from its activity labels alone: distracting labels pull
//! the score down, labels mentioning the task push it up. It answers in the
//! same JSON shape a model-backed oracle is prompted to produce, so it can
//! stand in wherever no model is configured.

use serde_json::json;

use crate::error::CapabilityError;
use crate::integrations::traits::{ProductivityOracle, Snapshot};
use crate::monitor::Blocklist;

const DISTRACTED_SCORE: u8 = 2;
const FOCUSED_SCORE: u8 = 8;
const NEUTRAL_SCORE: u8 = 5;

/// Words shorter than this are ignored when matching the task name.
const MIN_KEYWORD_LEN: usize = 4;

#[derive(Debug, Clone)]
pub struct KeywordOracle {
    blocklist: Blocklist,
}

impl KeywordOracle {
    pub fn new(blocklist: Blocklist) -> Self {
        Self { blocklist }
    }
}

impl ProductivityOracle for KeywordOracle {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, snapshot: &Snapshot, task_name: &str) -> Result<String, CapabilityError> {
        let flagged = self.blocklist.flagged(&snapshot.activity_labels);
        let (score, reason) = if let Some(first) = flagged.first() {
            (DISTRACTED_SCORE, format!("Distracting activity: {first}"))
        } else if mentions_task(&snapshot.activity_labels, task_name) {
            (FOCUSED_SCORE, format!("Activity matches \"{task_name}\""))
        } else {
            (NEUTRAL_SCORE, "No clear signal either way".to_string())
        };
        Ok(json!({
            "score": score,
            "reason": reason,
            "is_productive": score >= FOCUSED_SCORE,
        })
        .to_string())
    }
}

fn mentions_task(labels: &[String], task_name: &str) -> bool {
    let keywords: Vec<String> = task_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .collect();
    labels.iter().any(|label| {
        let label = label.to_lowercase();
        keywords.iter().any(|k| label.contains(k.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(labels: &[&str]) -> Snapshot {
        Snapshot {
            captured_at: Utc::now(),
            activity_labels: labels.iter().map(|s| s.to_string()).collect(),
            image: None,
        }
    }

    fn score_of(raw: &str) -> u64 {
        serde_json::from_str::<serde_json::Value>(raw).unwrap()["score"]
            .as_u64()
            .unwrap()
    }

    #[test]
    fn blocked_activity_scores_low() {
        let oracle = KeywordOracle::new(Blocklist::new(["reddit.com"]));
        let raw = oracle
            .score(&snapshot(&["Calculus notes", "r/pics - reddit.com"]), "Calculus homework")
            .unwrap();
        assert_eq!(score_of(&raw), 2);
    }

    #[test]
    fn task_keywords_score_high() {
        let oracle = KeywordOracle::new(Blocklist::default());
        let raw = oracle
            .score(&snapshot(&["Calculus notes - Firefox"]), "Finish calculus homework")
            .unwrap();
        assert_eq!(score_of(&raw), 8);
    }

    #[test]
    fn unrelated_activity_is_neutral() {
        let oracle = KeywordOracle::new(Blocklist::default());
        let raw = oracle.score(&snapshot(&["Terminal"]), "Essay").unwrap();
        assert_eq!(score_of(&raw), 5);
    }
}
