//! Thread-safe task registry shared by the timer, the monitor and the caller.
//!
//! Every operation takes the internal lock exactly once, so a
//! select-then-credit sequence can never interleave with a concurrent
//! removal or completion. Callers only ever receive copies.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{parse_due_date, parse_minutes, Priority, Task};

/// Label reported when there is no active task.
pub const FALLBACK_TASK_NAME: &str = "General work";

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Aggregate counters over every stored task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_progress_minutes: u64,
    pub completed_count: usize,
    pub total_count: usize,
}

/// Owned store of tasks. Wrap in an `Arc` and hand clones to each loop.
pub struct TaskRegistry {
    tasks: Mutex<Vec<Task>>,
    default_minutes: u32,
    today: Today,
}

impl TaskRegistry {
    /// Create an empty registry. `default_minutes` replaces unusable estimates
    /// and is normally the configured work-interval length.
    pub fn new(default_minutes: u32) -> Self {
        Self::from_tasks(default_minutes, Vec::new())
    }

    /// Rebuild a registry from previously persisted tasks.
    pub fn from_tasks(default_minutes: u32, tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            default_minutes: default_minutes.max(1),
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Override the calendar used for urgency. Intended for tests and replays.
    pub fn with_today<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Add a task, normalizing every field.
    ///
    /// Unparsable or non-positive minutes fall back to the default estimate,
    /// unknown priorities become `medium`, unparsable dates are dropped and a
    /// blank name is stored as [`FALLBACK_TASK_NAME`].
    pub fn add(
        &self,
        name: &str,
        estimated_minutes: &str,
        due_date: Option<&str>,
        priority: Option<&str>,
    ) -> Task {
        let name = match name.trim() {
            "" => {
                warn!(fallback = FALLBACK_TASK_NAME, "blank task name");
                FALLBACK_TASK_NAME
            }
            trimmed => trimmed,
        };

        let minutes = parse_minutes(estimated_minutes).unwrap_or(self.default_minutes);
        let priority = priority.map(Priority::parse_lenient).unwrap_or_default();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            estimated_minutes: minutes,
            due_date: due_date.and_then(parse_due_date),
            priority,
            progress_minutes: 0,
            completed: false,
            created_at: Utc::now(),
        };

        self.lock().push(task.clone());
        info!(task = %task.name, minutes, %priority, "task added");
        task
    }

    /// Mark the first matching active or completed task as done.
    ///
    /// Returns `false` when no task matches.
    pub fn complete(&self, name: &str) -> bool {
        let mut tasks = self.lock();
        match tasks.iter_mut().find(|t| t.matches(name)) {
            Some(task) => {
                task.completed = true;
                info!(task = %task.name, "task completed");
                true
            }
            None => {
                info!(task = name, "task not found");
                false
            }
        }
    }

    /// Delete every task matching `name`. Returns how many were removed.
    pub fn remove(&self, name: &str) -> usize {
        let mut tasks = self.lock();
        let before = tasks.len();
        tasks.retain(|t| !t.matches(name));
        let removed = before - tasks.len();
        if removed == 0 {
            info!(task = name, "task not found");
        } else {
            info!(task = name, removed, "task removed");
        }
        removed
    }

    /// Add `minutes` of progress to the top-ranked active task.
    ///
    /// Returns the credited task, or `None` when nothing is active.
    pub fn credit_progress(&self, minutes: u32) -> Option<Task> {
        let today = (self.today)();
        let mut tasks = self.lock();
        let top = tasks
            .iter_mut()
            .filter(|t| !t.completed)
            // min_by_key keeps the first of equal keys, i.e. insertion order.
            .min_by_key(|t| t.score_on(today))?;
        top.progress_minutes = top.progress_minutes.saturating_add(minutes);
        debug!(task = %top.name, minutes, total = top.progress_minutes, "progress credited");
        Some(top.clone())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Copies of all non-completed tasks in insertion order.
    pub fn list_active(&self) -> Vec<Task> {
        self.lock().iter().filter(|t| !t.completed).cloned().collect()
    }

    /// Copies of every task, completed ones included.
    pub fn all(&self) -> Vec<Task> {
        self.lock().clone()
    }

    /// Active tasks, most important first. Ties keep insertion order.
    pub fn select_ranked(&self) -> Vec<Task> {
        let today = (self.today)();
        let mut active = self.list_active();
        active.sort_by_key(|t| t.score_on(today));
        active
    }

    /// Name of the top-ranked active task, or [`FALLBACK_TASK_NAME`].
    pub fn current_task_name(&self) -> String {
        self.select_ranked()
            .into_iter()
            .next()
            .map(|t| t.name)
            .unwrap_or_else(|| FALLBACK_TASK_NAME.to_string())
    }

    /// First task matching `name`, if any.
    pub fn find(&self, name: &str) -> Option<Task> {
        self.lock().iter().find(|t| t.matches(name)).cloned()
    }

    pub fn stats(&self) -> RegistryStats {
        let tasks = self.lock();
        RegistryStats {
            total_progress_minutes: tasks.iter().map(|t| t.progress_minutes as u64).sum(),
            completed_count: tasks.iter().filter(|t| t.completed).count(),
            total_count: tasks.len(),
        }
    }

    /// Multi-line listing of every task.
    pub fn summary(&self) -> String {
        let tasks = self.lock();
        if tasks.is_empty() {
            return "No tasks added yet.".to_string();
        }
        tasks
            .iter()
            .map(Task::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Mutations are single field stores, so a poisoned lock still holds whole tasks.
    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(crate::storage::config::DEFAULT_WORK_MINUTES)
    }
}
