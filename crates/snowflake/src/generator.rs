use crate::{
    clock::{epoch_millis, unix_millis, Clock, SystemClock},
    error::Error,
    id::{MAX_PROCESS_ID, MAX_SEQUENCE, MAX_TIMESTAMP, MAX_WORKER_ID},
    SnowflakeId,
};
use jiff::Timestamp;
use std::sync::Mutex;
use tracing::warn;
use typed_builder::TypedBuilder;

/// 2015-01-01T00:00:00Z, the zero point of the 42-bit timestamp field.
pub const DEFAULT_EPOCH: Timestamp = Timestamp::constant(1_420_070_400, 0);

/// How many times the clock is re-read while waiting out a sequence rollover.
pub const DEFAULT_MAX_CLOCK_SPINS: u32 = 1_000;

/// Configures a Snowflake generator instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct SnowflakeSettings {
    /// Worker index in the range `[0, 31]`.
    #[builder]
    pub worker_id: u8,
    /// Process index in the range `[0, 31]`.
    #[builder]
    pub process_id: u8,
    /// Custom epoch used as the zero point for the 42-bit timestamp field.
    ///
    /// Every generator and decoder exchanging ids must agree on it.
    #[builder(default = DEFAULT_EPOCH)]
    pub start_epoch: Timestamp,
    /// Upper bound on clock re-reads after the per-millisecond sequence is
    /// exhausted. Exceeding it yields [`Error::ClockStalled`].
    #[builder(default = DEFAULT_MAX_CLOCK_SPINS)]
    pub max_clock_spins: u32,
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_millis: Option<u64>,
    sequence: u16,
}

/// Snowflake ID generator with wait-on-rollover semantics.
///
/// All calls to [`Snowflake::next_id`] on one instance are serialized by an
/// internal lock, so a single generator can be shared between threads.
pub struct Snowflake<C: Clock> {
    start_time: Timestamp,
    epoch_millis: u64,
    worker_id: u8,
    process_id: u8,
    max_clock_spins: u32,
    clock: C,
    state: Mutex<GeneratorState>,
}

impl Snowflake<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: SnowflakeSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Snowflake<C> {
    pub fn with_clock(settings: SnowflakeSettings, clock: C) -> Result<Self, Error> {
        if settings.worker_id > MAX_WORKER_ID {
            return Err(Error::InvalidWorkerId {
                worker_id: settings.worker_id,
                max_worker_id: MAX_WORKER_ID,
            });
        }
        if settings.process_id > MAX_PROCESS_ID {
            return Err(Error::InvalidProcessId {
                process_id: settings.process_id,
                max_process_id: MAX_PROCESS_ID,
            });
        }

        let epoch_millis = epoch_millis(settings.start_epoch)?;

        let now = clock.now();
        if settings.start_epoch > now {
            return Err(Error::EpochAhead {
                epoch: settings.start_epoch,
                now,
            });
        }

        Ok(Self {
            start_time: settings.start_epoch,
            epoch_millis,
            worker_id: settings.worker_id,
            process_id: settings.process_id,
            max_clock_spins: settings.max_clock_spins,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    pub fn worker_id(&self) -> u8 {
        self.worker_id
    }

    pub fn process_id(&self) -> u8 {
        self.process_id
    }

    pub fn start_epoch(&self) -> Timestamp {
        self.start_time
    }

    /// Generates the next unique SnowflakeId.
    ///
    /// - several calls in one millisecond bump the sequence
    /// - once the sequence wraps, wait for the clock to reach the next millisecond
    /// - a clock that moved backward is treated as a fresh millisecond
    ///
    /// Ids are strictly increasing as long as the clock never moves backward.
    pub fn next_id(&self) -> Result<SnowflakeId, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let now_timestamp = self.clock.now();
        let now = unix_millis(now_timestamp);

        // Only a fresh or regressed millisecond can land before the epoch;
        // after a rollover wait `now > last >= epoch`.
        //
        // Nothing is written back to `state` until the id is known to be
        // good, so a failed call cannot hand out a sequence twice.
        let (now, sequence) = match state.last_millis {
            Some(last) if now == last => {
                let sequence = (state.sequence + 1) & MAX_SEQUENCE;
                if sequence == 0 {
                    (self.wait_next_millis(last)?, 0)
                } else {
                    (now, sequence)
                }
            }
            Some(last) if now < last => {
                warn!(
                    last_millis = last,
                    now_millis = now,
                    "clock moved backwards; ids may no longer be increasing"
                );
                (now, 0)
            }
            _ => (now, 0),
        };

        let elapsed = now
            .checked_sub(self.epoch_millis)
            .ok_or(Error::EpochAhead {
                epoch: self.start_time,
                now: now_timestamp,
            })?;
        if elapsed > MAX_TIMESTAMP {
            return Err(Error::OverTimeLimit);
        }

        state.last_millis = Some(now);
        state.sequence = sequence;

        Ok(SnowflakeId::from_parts(
            elapsed,
            self.worker_id,
            self.process_id,
            sequence,
        ))
    }

    /// Re-reads the clock until it is past `last`, giving up after
    /// `max_clock_spins` attempts.
    fn wait_next_millis(&self, last: u64) -> Result<u64, Error> {
        let target = i64::try_from(last + 1)
            .ok()
            .and_then(|millis| Timestamp::from_millisecond(millis).ok());

        for _ in 0..self.max_clock_spins {
            if let Some(target) = target {
                self.clock.wait_until(target);
            }
            let now = self.clock.now_millis();
            if now > last {
                return Ok(now);
            }
        }

        warn!(
            last_millis = last,
            spins = self.max_clock_spins,
            "clock stalled while waiting for the next millisecond"
        );
        Err(Error::ClockStalled {
            last_millis: last,
            spins: self.max_clock_spins,
        })
    }
}
