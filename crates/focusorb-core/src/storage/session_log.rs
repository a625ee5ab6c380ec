//! Per-session record of monitor samples.
//!
//! Entries live in memory while the monitor runs. `save` appends the whole
//! session to a JSON array file:
//!
//! ```json
//! [{"session_start": "...", "session_end": "...", "entries": [...]}]
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::Result;

/// Scores at or above this count toward `high_count`.
const HIGH_SCORE: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub score: u8,
    pub reason: String,
    /// Activity labels seen in the sample.
    #[serde(default)]
    pub activity: Vec<String>,
}

/// One saved session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

impl SessionRecord {
    /// Mean score, or `None` for a session without entries.
    pub fn average_score(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: u64 = self.entries.iter().map(|e| e.score as u64).sum();
        Some(round1(total as f64 / self.entries.len() as f64))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Rounded to one decimal.
    pub avg_score: f64,
    pub total_checks: usize,
    /// Samples below the low-score threshold.
    pub low_count: usize,
    /// Samples at 7 or above.
    pub high_count: usize,
}

#[derive(Debug)]
pub struct SessionLog {
    started_at: DateTime<Utc>,
    entries: Mutex<Vec<LogEntry>>,
}

impl SessionLog {
    pub fn new() -> Self {
        let started_at = Utc::now();
        info!(%started_at, "session started");
        Self {
            started_at,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn record(&self, score: u8, reason: &str, activity: &[String]) {
        self.lock().push(LogEntry {
            timestamp: Utc::now(),
            score,
            reason: reason.to_string(),
            activity: activity.to_vec(),
        });
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn stats(&self, low_score_threshold: u8) -> SessionStats {
        let entries = self.lock();
        if entries.is_empty() {
            return SessionStats::default();
        }
        let total: u64 = entries.iter().map(|e| e.score as u64).sum();
        SessionStats {
            avg_score: round1(total as f64 / entries.len() as f64),
            total_checks: entries.len(),
            low_count: entries.iter().filter(|e| e.score < low_score_threshold).count(),
            high_count: entries.iter().filter(|e| e.score >= HIGH_SCORE).count(),
        }
    }

    /// Snapshot of the session as it would be saved now.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            session_start: self.started_at,
            session_end: Utc::now(),
            entries: self.entries(),
        }
    }

    /// Append this session to the history file at `path`.
    ///
    /// Returns `false` without touching the file when nothing was recorded.
    /// An unreadable or corrupt history file is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<bool> {
        let record = self.to_record();
        if record.entries.is_empty() {
            info!("nothing to save");
            return Ok(false);
        }

        let mut sessions = match load_history(path) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "starting a fresh session history");
                Vec::new()
            }
        };
        sessions.push(record);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&sessions)?)?;
        info!(path = %path.display(), "session saved");
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Read every saved session. A missing file is an empty history.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_history(path: &Path) -> Result<Vec<SessionRecord>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
