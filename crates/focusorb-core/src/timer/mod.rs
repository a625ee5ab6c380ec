mod engine;
mod schedule;

pub use engine::{BreakCallback, PomodoroTimer, StartOutcome, TimerState, WorkCallback};
pub use schedule::{BreakKind, TimerSettings};
