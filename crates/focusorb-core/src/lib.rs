//! # FocusOrb Core Library
//!
//! Core logic for the FocusOrb focus assistant: a task registry, a Pomodoro
//! timer that credits work time to the top-ranked task, and a focus monitor
//! that periodically scores what is on screen and nudges the user after a
//! run of low scores.
//!
//! ## Architecture
//!
//! - **Task registry**: thread-safe, ranked by priority and due-date urgency
//! - **Timer**: background thread cycling work and break intervals
//! - **Monitor**: background thread sampling activity and asking an oracle
//!   for a 1-10 productivity score, with hysteresis before alerting
//! - **Integrations**: traits for activity sources, oracles and notifiers,
//!   with command-line helper based implementations
//! - **Storage**: TOML configuration and a JSON session history
//!
//! ## Key Components
//!
//! - [`TaskRegistry`]: Shared task list
//! - [`PomodoroTimer`]: Work/break cycle
//! - [`Monitor`]: Focus sampling loop
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod integrations;
pub mod monitor;
pub mod storage;
pub mod task;
pub mod timer;

mod worker;

pub use error::{CapabilityError, ConfigError, CoreError};
pub use events::Event;
pub use integrations::{ActivitySource, Notifier, ProductivityOracle, Snapshot};
pub use monitor::{Blocklist, FocusLevel, Monitor, MonitorSettings, Verdict};
pub use storage::{Config, SessionLog, SessionRecord, SessionStats};
pub use task::{Priority, Task, TaskRegistry};
pub use timer::{BreakKind, PomodoroTimer, StartOutcome, TimerSettings, TimerState};
