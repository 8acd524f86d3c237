//! # Fibonacci Backoff
//!
//! Progressive pause generator for status polling and propagation retries.
//! Grows more slowly than exponential backoff, so a wait that settles after a
//! few seconds is noticed quickly while a long `UPDATING` phase does not hammer
//! the control plane.
//!
//! With the default poll settings (1s min, 10s max) the sequence is
//! 1s, 1s, 2s, 3s, 5s, 8s, 10s, 10s, ...
//!
//! ## Usage
//!
//! ```rust
//! use kinesis_analytics_controller::controller::backoff::FibonacciBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = FibonacciBackoff::new(Duration::from_secs(1), Duration::from_secs(10));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(3));
//! ```

use crate::config::PollSettings;
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each pause is the sum of the previous two, capped at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum pause (for reset)
    min: Duration,
    /// Previous pause
    prev: Duration,
    /// Next pause to hand out
    current: Duration,
    /// Cap
    max: Duration,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff
    ///
    /// # Arguments
    ///
    /// * `min` - First (and second) pause; a zero `min` is raised to one millisecond
    /// * `max` - Cap on every pause; raised to `min` if smaller
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.max(Duration::from_millis(1));
        Self {
            min,
            prev: Duration::ZERO,
            current: min,
            max: max.max(min),
        }
    }

    /// Backoff paced by the configured poll settings
    #[must_use]
    pub fn from_poll_settings(poll: &PollSettings) -> Self {
        Self::new(poll.min_interval, poll.max_interval)
    }

    /// Get the next pause and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;

        let next = self.prev.saturating_add(self.current);
        self.prev = self.current;
        self.current = next.min(self.max);

        result
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev = Duration::ZERO;
        self.current = self.min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(secs(1), secs(10));

        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(2));
        assert_eq!(backoff.next_backoff(), secs(3));
        assert_eq!(backoff.next_backoff(), secs(5));
        assert_eq!(backoff.next_backoff(), secs(8));
        assert_eq!(backoff.next_backoff(), secs(10)); // max
    }

    #[test]
    fn test_fibonacci_backoff_max_cap() {
        let mut backoff = FibonacciBackoff::new(secs(1), secs(10));
        for _ in 0..7 {
            backoff.next_backoff();
        }
        // 13s would be next, capped
        assert_eq!(backoff.next_backoff(), secs(10));
        assert_eq!(backoff.next_backoff(), secs(10));
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(secs(1), secs(10));

        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(2));
        assert_eq!(backoff.next_backoff(), secs(3));

        backoff.reset();

        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(1));
        assert_eq!(backoff.next_backoff(), secs(2));
    }

    #[test]
    fn test_fibonacci_backoff_sub_second_intervals() {
        let mut backoff =
            FibonacciBackoff::new(Duration::from_millis(100), Duration::from_millis(250));

        assert_eq!(backoff.next_backoff(), Duration::from_millis(100));
        assert_eq!(backoff.next_backoff(), Duration::from_millis(100));
        assert_eq!(backoff.next_backoff(), Duration::from_millis(200));
        assert_eq!(backoff.next_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn test_fibonacci_backoff_max_below_min() {
        let mut backoff = FibonacciBackoff::new(secs(5), secs(1));
        assert_eq!(backoff.next_backoff(), secs(5));
        assert_eq!(backoff.next_backoff(), secs(5));
        assert_eq!(backoff.next_backoff(), secs(5));
    }

    #[test]
    fn test_fibonacci_backoff_zero_min_never_returns_zero() {
        let mut backoff = FibonacciBackoff::new(Duration::ZERO, Duration::ZERO);
        for _ in 0..5 {
            assert!(backoff.next_backoff() > Duration::ZERO);
        }
    }
}
