//! Elapsed-time gates for tick-driven animation.
//!
//! Nothing in the core sleeps. Each animation keeps a [`Cadence`] and asks
//! it once per tick whether its interval has passed.

use embassy_time::{Duration, Instant};

/// Tracks the last time an action ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cadence {
    last: Option<Instant>,
}

impl Cadence {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns true (and records `now`) if the action should run.
    ///
    /// A fresh or reset cadence is due immediately.
    pub fn due(&mut self, now: Instant, interval: Duration) -> bool {
        let ready = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        };
        if ready {
            self.last = Some(now);
        }
        ready
    }

    /// Make the next `due` call fire immediately
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Milliseconds from a persisted `u16` field
pub fn millis(ms: u16) -> Duration {
    Duration::from_millis(u64::from(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cadence_is_due() {
        let mut c = Cadence::new();
        assert!(c.due(Instant::from_millis(5), Duration::from_millis(100)));
        assert!(!c.due(Instant::from_millis(50), Duration::from_millis(100)));
        assert!(c.due(Instant::from_millis(105), Duration::from_millis(100)));
    }

    #[test]
    fn test_reset_fires_immediately() {
        let mut c = Cadence::new();
        assert!(c.due(Instant::from_millis(0), Duration::from_millis(20)));
        assert!(!c.due(Instant::from_millis(10), Duration::from_millis(20)));
        c.reset();
        assert!(c.due(Instant::from_millis(11), Duration::from_millis(20)));
    }

    #[test]
    fn test_clock_going_backwards_is_not_due() {
        let mut c = Cadence::new();
        assert!(c.due(Instant::from_millis(100), Duration::from_millis(10)));
        assert!(!c.due(Instant::from_millis(50), Duration::from_millis(10)));
    }
}
