//! Tick-driven interval timers
//!
//! Replaces wall-clock intervals: a timer only advances when the simulation
//! ticks, so pausing freezes it and resuming never replays missed periods.

use serde::{Deserialize, Serialize};

use crate::ms_to_ticks;

/// Repeating countdown that fires once every `period` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTimer {
    period: u64,
    remaining: u64,
}

impl IntervalTimer {
    pub fn new(period_ticks: u64) -> Self {
        let period = period_ticks.max(1);
        Self {
            period,
            remaining: period,
        }
    }

    pub fn from_ms(ms: u64) -> Self {
        Self::new(ms_to_ticks(ms))
    }

    /// Advance one tick; returns true when the period elapses
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.period;
            true
        } else {
            false
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let mut timer = IntervalTimer::new(3);
        let fired: Vec<bool> = (0..7).map(|_| timer.tick()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_remaining_counts_down_and_rearms() {
        let mut timer = IntervalTimer::new(4);
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining(), 2);
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining(), timer.period());
    }

    #[test]
    fn test_zero_period_is_one_tick() {
        let mut timer = IntervalTimer::new(0);
        assert!(timer.tick());
        assert!(timer.tick());
    }
}
