//! Fixed-cadence tick scheduling.
//!
//! The engine never reads the clock. A [`Ticker`] converts measured wall
//! time into whole ticks and carries the remainder, so the total time fed to
//! [`Game::advance`](crate::Game::advance) tracks real time whatever the
//! timer jitter.

use std::time::Duration;

/// Fastest supported cadence: one tick per nanosecond.
pub const MAX_TICK_HZ: u32 = 1_000_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct Ticker {
    tick: Duration,
    carry: Duration,
}

impl Ticker {
    /// A ticker firing `hz` times per second, clamped to `1..=MAX_TICK_HZ`.
    pub fn new(hz: u32) -> Self {
        let hz = hz.clamp(1, MAX_TICK_HZ);
        Self {
            tick: Duration::from_secs(1) / hz,
            carry: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.tick
    }

    /// Seconds of game time covered by one tick.
    pub fn tick_seconds(&self) -> f64 {
        self.tick.as_secs_f64()
    }

    /// Feed measured elapsed time; returns how many ticks are now due.
    pub fn accumulate(&mut self, elapsed: Duration) -> u64 {
        let carry = self.carry.saturating_add(elapsed).as_nanos();
        let tick = self.tick.as_nanos();
        // The remainder is below one tick, so it fits in a u64 of nanos.
        self.carry = Duration::from_nanos((carry % tick) as u64);
        u64::try_from(carry / tick).unwrap_or(u64::MAX)
    }

    /// Time already measured but not yet worth a full tick.
    pub fn pending(&self) -> Duration {
        self.carry
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(clicker_core::TICKS_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cadence_is_ten_hz() {
        let t = Ticker::default();
        assert_eq!(t.interval(), Duration::from_millis(100));
        assert!((t.tick_seconds() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn remainder_carries_over() {
        let mut t = Ticker::new(10);
        assert_eq!(t.accumulate(Duration::from_millis(250)), 2);
        assert_eq!(t.pending(), Duration::from_millis(50));
        assert_eq!(t.accumulate(Duration::from_millis(60)), 1);
        assert_eq!(t.pending(), Duration::from_millis(10));
    }

    #[test]
    fn drifting_timer_still_sums_to_real_time() {
        let mut t = Ticker::new(10);
        let mut ticks = 0;
        for ms in [95, 110, 101, 99, 130, 65] {
            ticks += t.accumulate(Duration::from_millis(ms));
        }
        assert_eq!(ticks, 6);
        assert_eq!(t.pending(), Duration::ZERO);
    }

    #[test]
    fn zero_hz_is_clamped() {
        assert_eq!(Ticker::new(0).interval(), Duration::from_secs(1));
    }

    #[test]
    fn excessive_hz_is_clamped() {
        let mut t = Ticker::new(2_000_000_000);
        assert_eq!(t.interval(), Duration::from_nanos(1));
        assert_eq!(t.accumulate(Duration::from_micros(3)), 3_000);
        assert_eq!(t.pending(), Duration::ZERO);
    }

    #[test]
    fn long_waits_are_counted_in_full() {
        let mut t = Ticker::new(10);
        let ticks = t.accumulate(Duration::from_secs(1_000_000_000_000_000));
        assert_eq!(ticks, 10_000_000_000_000_000);
        assert_eq!(t.pending(), Duration::ZERO);
        assert_eq!(t.accumulate(Duration::from_millis(100)), 1);
    }
}
