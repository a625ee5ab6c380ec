/// Counts consecutive low scores and decides when to alert.
///
/// The counter resets on any score at or above the threshold, and again
/// right after it fires, so an alert always needs a fresh run of lows.
#[derive(Debug, Clone)]
pub struct LowScoreTracker {
    threshold: u8,
    trigger: u32,
    consecutive: u32,
}

impl LowScoreTracker {
    /// `trigger` is clamped to at least 1.
    pub fn new(threshold: u8, trigger: u32) -> Self {
        Self {
            threshold,
            trigger: trigger.max(1),
            consecutive: 0,
        }
    }

    /// Feed one score. Returns `true` when an alert should fire.
    pub fn observe(&mut self, score: u8) -> bool {
        if score < self.threshold {
            self.consecutive += 1;
        } else {
            self.consecutive = 0;
        }

        if self.consecutive >= self.trigger {
            self.consecutive = 0;
            true
        } else {
            false
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}
