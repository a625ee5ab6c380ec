use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    pub fn from_is_long(is_long: bool) -> Self {
        if is_long {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BreakKind::Short => "Short break",
            BreakKind::Long => "Long break",
        }
    }
}

impl fmt::Display for BreakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Work/break cycle parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    /// Every Nth break is long. Treated as 1 if zero.
    pub intervals_before_long_break: u32,
    /// Wall-clock length of one scheduled minute. Sixty seconds except in
    /// tests and demos.
    pub minute: Duration,
}

impl TimerSettings {
    /// Whether the break after work interval `interval` (1-based) is long.
    pub fn is_long_break(&self, interval: u32) -> bool {
        interval % self.intervals_before_long_break.max(1) == 0
    }

    pub fn break_kind(&self, interval: u32) -> BreakKind {
        BreakKind::from_is_long(self.is_long_break(interval))
    }

    pub fn break_minutes(&self, kind: BreakKind) -> u32 {
        match kind {
            BreakKind::Short => self.short_break_minutes,
            BreakKind::Long => self.long_break_minutes,
        }
    }

    pub fn work_duration(&self) -> Duration {
        self.scaled(self.work_minutes)
    }

    pub fn break_duration(&self, kind: BreakKind) -> Duration {
        self.scaled(self.break_minutes(kind))
    }

    fn scaled(&self, minutes: u32) -> Duration {
        self.minute.checked_mul(minutes).unwrap_or(Duration::MAX)
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            intervals_before_long_break: 4,
            minute: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nth_break_is_long() {
        let s = TimerSettings::default();
        let kinds: Vec<_> = (1..=8).map(|i| s.break_kind(i)).collect();
        assert_eq!(
            kinds,
            vec![
                BreakKind::Short,
                BreakKind::Short,
                BreakKind::Short,
                BreakKind::Long,
                BreakKind::Short,
                BreakKind::Short,
                BreakKind::Short,
                BreakKind::Long,
            ]
        );
    }

    #[test]
    fn zero_intervals_means_every_break_is_long() {
        let s = TimerSettings {
            intervals_before_long_break: 0,
            ..TimerSettings::default()
        };
        assert!(s.is_long_break(1));
        assert!(s.is_long_break(2));
    }

    #[test]
    fn durations_follow_minute_length() {
        let s = TimerSettings {
            minute: Duration::from_millis(10),
            ..TimerSettings::default()
        };
        assert_eq!(s.work_duration(), Duration::from_millis(250));
        assert_eq!(s.break_duration(BreakKind::Short), Duration::from_millis(50));
        assert_eq!(s.break_duration(BreakKind::Long), Duration::from_millis(150));
        assert_eq!(TimerSettings::default().work_duration(), Duration::from_secs(25 * 60));
    }
}
