//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Manually driven clock.
///
/// Time is an offset from a fixed origin, stored in an atomic so that
/// stress tests can read it from many threads without a lock. All clones
/// share the same offset.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-helpers")]
/// # fn main() {
/// use window_admission::infrastructure::mocks::MockClock;
/// use window_admission::Clock;
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// let origin = clock.origin();
/// assert_eq!(clock.now(), origin);
///
/// clock.advance(Duration::from_secs(61));
/// assert_eq!(clock.now(), origin + Duration::from_secs(61));
///
/// clock.set_offset(Duration::from_secs(5));
/// assert_eq!(clock.now(), origin + Duration::from_secs(5));
/// # }
/// # #[cfg(not(feature = "test-helpers"))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a mock clock whose origin is the real current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a mock clock starting at a specific instant.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The instant this clock started from.
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Advance the clock by a duration and return the new instant.
    pub fn advance(&self, duration: Duration) -> Instant {
        let nanos = saturating_nanos(duration);
        let previous = self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
        self.origin + Duration::from_nanos(previous.saturating_add(nanos))
    }

    /// Move the clock to `origin + offset`. May move time backwards.
    pub fn set_offset(&self, offset: Duration) {
        self.offset_nanos
            .store(saturating_nanos(offset), Ordering::SeqCst);
    }

    /// Elapsed time since the origin.
    pub fn offset(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_mock_clock() {
        let start = Instant::now();
        let clock = MockClock::starting_at(start);

        assert_eq!(clock.now(), start);

        let advanced = clock.advance(Duration::from_secs(10));
        assert_eq!(advanced, start + Duration::from_secs(10));
        assert_eq!(clock.now(), advanced);

        clock.set_offset(Duration::from_secs(3));
        assert_eq!(clock.now(), start + Duration::from_secs(3));
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::new();
        let clock_clone = clock.clone();

        let handle = thread::spawn(move || {
            clock_clone.advance(Duration::from_secs(5));
        });
        handle.join().unwrap();

        assert_eq!(clock.offset(), Duration::from_secs(5));
    }
}
