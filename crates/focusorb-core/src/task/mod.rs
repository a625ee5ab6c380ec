//! Task model and priority scoring.
//!
//! A task is identified by its name, compared case-insensitively. Ranking is
//! a pure function of the task and the current date:
//!
//! ```text
//! priority_weight = high 3 | medium 2 | low 1
//! days_until_due  = (due_date - today) in days, minus one
//! urgency_weight  = 0 without a due date, else max(0, 30 - days_until_due)
//! score           = -(priority_weight * 10 + urgency_weight)
//! ```
//!
//! Lower scores rank first.

mod registry;

pub use registry::{RegistryStats, TaskRegistry, FALLBACK_TASK_NAME};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format accepted for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Days before the due date at which urgency starts to count.
const URGENCY_HORIZON_DAYS: i64 = 30;

/// Priority tier of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parse a tier name, falling back to `Medium` for anything unknown.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn weight(&self) -> i64 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// One unit of tracked work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Generated identifier, stable across persistence round trips
    pub id: String,
    /// Trimmed, non-empty name; the case-insensitive lookup key
    pub name: String,
    /// Estimated duration in minutes (always positive)
    pub estimated_minutes: u32,
    /// Optional due date
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    /// Minutes credited by completed work intervals
    #[serde(default)]
    pub progress_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether `name` refers to this task (case-insensitive, trimmed).
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Full days left before the due date starts, counted from partway
    /// through `today`: one less than the calendar difference, so a task due
    /// tomorrow has 0 and one due today has -1.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| (due - today).num_days() - 1)
    }

    /// Priority score as of `today`. Lower is more important.
    pub fn score_on(&self, today: NaiveDate) -> i64 {
        let urgency = self
            .days_until_due(today)
            .map(|days| (URGENCY_HORIZON_DAYS - days).max(0))
            .unwrap_or(0);
        -(self.priority.weight() * 10 + urgency)
    }

    /// Number of work intervals this task should take, never less than one.
    pub fn estimate_intervals(&self, work_minutes: u32) -> u32 {
        if work_minutes == 0 {
            return 1;
        }
        let intervals = (self.estimated_minutes as f64 / work_minutes as f64).round() as u32;
        intervals.max(1)
    }

    /// One-line human summary used by [`TaskRegistry::summary`].
    pub fn summary_line(&self) -> String {
        let status = if self.completed { "[x]" } else { "[ ]" };
        let due = self
            .due_date
            .map(|d| d.format(DUE_DATE_FORMAT).to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{status} {} ({} min, {}) - due: {due}",
            self.name, self.estimated_minutes, self.priority
        )
    }
}

/// Parse a due date, treating blanks and unparsable text as "no due date".
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).ok()
}

/// Parse an estimate in minutes.
///
/// Fractional input is truncated. Returns `None` for anything that does not
/// yield a positive whole number of minutes.
pub fn parse_minutes(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let minutes = value.trunc();
    if minutes < 1.0 || minutes > u32::MAX as f64 {
        return None;
    }
    Some(minutes as u32)
}
