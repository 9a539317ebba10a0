use jiff::Timestamp;
use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;

    /// Block until the clock roughly reaches the target time.
    ///
    /// Implementations may return early; callers re-read [`Clock::now`].
    fn wait_until(&self, target: Timestamp);

    /// Milliseconds since the Unix epoch, clamped at zero.
    fn now_millis(&self) -> u64 {
        unix_millis(self.now())
    }
}

pub(crate) fn unix_millis(timestamp: Timestamp) -> u64 {
    u64::try_from(timestamp.as_millisecond()).unwrap_or(0)
}

/// Epoch as Unix milliseconds. Pre-1970 epochs can't be represented in the
/// unsigned offset math and are rejected.
pub(crate) fn epoch_millis(epoch: Timestamp) -> Result<u64, crate::Error> {
    u64::try_from(epoch.as_millisecond()).map_err(|_| crate::Error::EpochBeforeUnix { epoch })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        let remaining_ns = target.as_nanosecond() - Timestamp::now().as_nanosecond();
        if remaining_ns <= 0 {
            return;
        }
        // Gaps here are sub-millisecond, so a single sleep is enough.
        let remaining_ns = u64::try_from(remaining_ns).unwrap_or(u64::MAX);
        std::thread::sleep(Duration::from_nanos(remaining_ns));
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use crate::clock::Clock;
    use jiff::{SignedDuration, Timestamp};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    pub(crate) struct TestClock {
        inner: Arc<Mutex<TestClockState>>,
    }

    struct TestClockState {
        now: Timestamp,
        frozen: bool,
    }

    impl TestClock {
        pub(crate) fn new(now: Timestamp) -> Self {
            Self {
                inner: Arc::new(Mutex::new(TestClockState { now, frozen: false })),
            }
        }

        pub(crate) fn from_millis(millis: i64) -> Self {
            Self::new(Timestamp::from_millisecond(millis).unwrap())
        }

        pub(crate) fn set(&self, now: Timestamp) {
            self.state().now = now;
        }

        pub(crate) fn advance_millis(&self, millis: i64) {
            let mut state = self.state();
            state.now = state
                .now
                .checked_add(SignedDuration::from_millis(millis))
                .unwrap();
        }

        /// A frozen clock ignores `wait_until`, simulating a stalled time source.
        pub(crate) fn freeze(&self) {
            self.state().frozen = true;
        }

        fn state(&self) -> std::sync::MutexGuard<'_, TestClockState> {
            self.inner
                .lock()
                .expect("test clock lock should not be poisoned")
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Timestamp {
            self.state().now
        }

        fn wait_until(&self, target: Timestamp) {
            let mut state = self.state();
            // jump straight to the target; tests never need to block
            if !state.frozen && target > state.now {
                state.now = target;
            }
        }
    }

    #[test]
    fn test_clock_works() {
        let base = Timestamp::from_millisecond(1_000).unwrap();
        let clock = TestClock::new(base);
        assert_eq!(clock.now(), base);
        assert_eq!(clock.now_millis(), 1_000);

        let target = Timestamp::from_millisecond(5_000).unwrap();
        clock.wait_until(target);
        assert_eq!(clock.now(), target);

        clock.advance_millis(-10);
        assert_eq!(clock.now_millis(), 4_990);
    }

    #[test]
    fn frozen_clock_does_not_advance() {
        let clock = TestClock::from_millis(1_000);
        clock.freeze();
        clock.wait_until(Timestamp::from_millisecond(2_000).unwrap());
        assert_eq!(clock.now_millis(), 1_000);
    }

    #[test]
    fn now_millis_clamps_pre_unix_times() {
        let clock = TestClock::from_millis(-5);
        assert_eq!(clock.now_millis(), 0);
    }
}
