mod blocklist;
mod engine;
mod hysteresis;
mod verdict;

pub use blocklist::Blocklist;
pub use engine::{AlertCallback, Monitor, MonitorSettings, Sample, ScoreCallback};
pub use hysteresis::LowScoreTracker;
pub use verdict::{FocusLevel, Verdict, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};
