use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// What the monitor hands to the oracle for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    /// Foreground window or tab titles at capture time.
    pub activity_labels: Vec<String>,
    /// Encoded screen capture, when the activity source can provide one.
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

/// Lists what the user is currently looking at.
///
/// Implementations may block (spawning helper processes, querying the
/// window server). The monitor never calls them while holding a lock.
pub trait ActivitySource: Send + Sync {
    /// Current foreground activity labels. May be empty.
    fn list_activity_labels(&self) -> Result<Vec<String>, CapabilityError>;

    /// Optional screen capture to accompany the labels.
    fn capture_image(&self) -> Result<Option<Vec<u8>>, CapabilityError> {
        Ok(None) // default: labels only
    }
}

/// Rates how well a snapshot matches the task the user should be doing.
///
/// The response is the collaborator's raw text, expected to hold a JSON
/// object like `{"score": 7, "reason": "..."}`. The monitor parses it
/// leniently, so LLM-backed oracles can return model output untouched.
pub trait ProductivityOracle: Send + Sync {
    /// Unique identifier used in logs (e.g. "keyword", "gemini").
    fn name(&self) -> &str;

    fn score(&self, snapshot: &Snapshot, task_name: &str) -> Result<String, CapabilityError>;
}

/// Fire-and-forget user notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<(), CapabilityError>;
}
