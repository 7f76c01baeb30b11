//! Clock - Injectable time source
//!
//! TigerStyle: The simulated cluster never reads wall time directly.
//! Production code uses [`SystemClock`]; tests drive a [`SimClock`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::constants::{SIM_TIME_ADVANCE_MS_MAX, TIME_MS_PER_SEC};

/// A source of "now".
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// SystemClock
// =============================================================================

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// SimClock
// =============================================================================

/// A simulated clock for deterministic testing.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the cluster.
///
/// TigerStyle:
/// - Time only moves forward
/// - All time operations are explicit
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current time in milliseconds since the Unix epoch
    current_ms: Arc<AtomicI64>,
}

impl SimClock {
    /// Create a clock starting at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::at_ms(0)
    }

    /// Create a clock starting at the given millisecond timestamp.
    ///
    /// # Panics
    /// Panics if `start_ms` is negative.
    #[must_use]
    pub fn at_ms(start_ms: i64) -> Self {
        assert!(start_ms >= 0, "start_ms must be non-negative, got {start_ms}");
        Self {
            current_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Create a clock starting at the current wall-clock time.
    #[must_use]
    pub fn starting_now() -> Self {
        Self::at_ms(Utc::now().timestamp_millis())
    }

    /// Current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.current_ms.load(Ordering::Acquire)
    }

    /// Advance time by the given milliseconds.
    ///
    /// # Panics
    /// Panics if ms exceeds `SIM_TIME_ADVANCE_MS_MAX`.
    ///
    /// # Returns
    /// The new current time.
    pub fn advance_ms(&self, ms: u64) -> i64 {
        // Precondition
        assert!(
            ms <= SIM_TIME_ADVANCE_MS_MAX,
            "advance_ms({ms}) exceeds max ({SIM_TIME_ADVANCE_MS_MAX})"
        );

        #[allow(clippy::cast_possible_wrap)]
        let delta = ms as i64;
        let old = self.current_ms.fetch_add(delta, Ordering::AcqRel);
        let new = old + delta;

        // Postcondition
        assert!(new >= old, "time must not go backwards");
        new
    }

    /// Advance time by whole seconds.
    pub fn advance_secs(&self, secs: u64) -> i64 {
        self.advance_ms(secs * TIME_MS_PER_SEC)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms()).unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_time() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(clock.now().timestamp(), 0);
    }

    #[test]
    fn test_advance_is_shared_between_clones() {
        let clock = SimClock::at_ms(5000);
        let other = clock.clone();

        other.advance_ms(1500);

        assert_eq!(clock.now_ms(), 6500);
        assert_eq!(clock.now().timestamp_millis(), 6500);
    }

    #[test]
    fn test_advance_secs() {
        let clock = SimClock::new();
        assert_eq!(clock.advance_secs(3), 3000);
    }

    #[test]
    #[should_panic(expected = "advance_ms")]
    fn test_advance_exceeds_max() {
        let clock = SimClock::new();
        clock.advance_ms(SIM_TIME_ADVANCE_MS_MAX + 1);
    }

    #[test]
    fn test_system_clock_moves() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
