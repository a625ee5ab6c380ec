use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitor::FocusLevel;
use crate::timer::BreakKind;

/// Every state change the loops report to the caller.
///
/// The engine itself only invokes callbacks; callers that need to marshal
/// work onto another thread wrap each callback into one of these and push
/// it through a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A work interval began.
    WorkStarted {
        interval: u32,
        at: DateTime<Utc>,
    },
    /// A work interval finished and a break began.
    BreakStarted {
        minutes: u32,
        kind: BreakKind,
        at: DateTime<Utc>,
    },
    /// The monitor produced a score for one sample.
    ScoreUpdated {
        score: u8,
        level: FocusLevel,
        at: DateTime<Utc>,
    },
    /// Sustained low scores crossed the alert threshold.
    AlertRaised {
        flagged: Vec<String>,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn work_started(interval: u32) -> Self {
        Event::WorkStarted {
            interval,
            at: Utc::now(),
        }
    }

    pub fn break_started(minutes: u32, is_long: bool) -> Self {
        Event::BreakStarted {
            minutes,
            kind: BreakKind::from_is_long(is_long),
            at: Utc::now(),
        }
    }

    pub fn score_updated(score: u8) -> Self {
        Event::ScoreUpdated {
            score,
            level: FocusLevel::from_score(score),
            at: Utc::now(),
        }
    }

    pub fn alert_raised(flagged: &[String]) -> Self {
        Event::AlertRaised {
            flagged: flagged.to_vec(),
            at: Utc::now(),
        }
    }
}
