use crate::{
    clock::{epoch_millis, Clock, SystemClock},
    error::Error,
    generator::DEFAULT_EPOCH,
    id::{MAX_PROCESS_ID, MAX_SEQUENCE, MAX_WORKER_ID, TIMESTAMP_SHIFT},
    SnowflakeId,
};
use jiff::Timestamp;

/// Stateless reader for ids produced with a given epoch.
///
/// An id is only accepted when its reconstructed timestamp lies between the
/// epoch and the decoder's current clock time.
#[derive(Debug, Clone)]
pub struct Decoder<C: Clock> {
    epoch_millis: u64,
    clock: C,
}

impl Decoder<SystemClock> {
    /// Fails with [`Error::EpochBeforeUnix`] for epochs before 1970.
    pub fn new(epoch: Timestamp) -> Result<Self, Error> {
        Self::with_clock(epoch, SystemClock)
    }
}

impl Default for Decoder<SystemClock> {
    fn default() -> Self {
        Self {
            epoch_millis: DEFAULT_EPOCH.as_millisecond().unsigned_abs(),
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Decoder<C> {
    pub fn with_clock(epoch: Timestamp, clock: C) -> Result<Self, Error> {
        Ok(Self {
            epoch_millis: epoch_millis(epoch)?,
            clock,
        })
    }

    pub fn decode(&self, id: u64) -> SnowflakeId {
        SnowflakeId::from(id)
    }

    /// Absolute Unix milliseconds of `id`, without any range check.
    pub fn timestamp_millis(&self, id: u64) -> u64 {
        (id >> TIMESTAMP_SHIFT) + self.epoch_millis
    }

    /// Reconstructs the instant `id` was generated at.
    ///
    /// Fails with [`Error::TimestampOutOfRange`] for ids dated before the
    /// epoch or after the current time.
    pub fn extract_timestamp(&self, id: u64) -> Result<Timestamp, Error> {
        let timestamp_ms = self.checked_timestamp_millis(id)?;
        i64::try_from(timestamp_ms)
            .ok()
            .and_then(|millis| Timestamp::from_millisecond(millis).ok())
            .ok_or_else(|| Error::TimestampOutOfRange {
                timestamp_ms,
                epoch_ms: self.epoch_millis,
                now_ms: self.clock.now_millis(),
            })
    }

    pub fn is_valid(&self, id: u64) -> bool {
        if self.checked_timestamp_millis(id).is_err() {
            return false;
        }
        let id = self.decode(id);
        id.worker_id() <= MAX_WORKER_ID
            && id.process_id() <= MAX_PROCESS_ID
            && id.sequence() <= MAX_SEQUENCE
    }

    /// Parses a decimal string and validates the result. Anything that is not
    /// an unsigned 64-bit integer is invalid.
    pub fn is_valid_str(&self, id: &str) -> bool {
        id.parse::<SnowflakeId>()
            .is_ok_and(|id| self.is_valid(id.as_u64()))
    }

    fn checked_timestamp_millis(&self, id: u64) -> Result<u64, Error> {
        let timestamp_ms = self.timestamp_millis(id);
        let now_ms = self.clock.now_millis();
        if timestamp_ms < self.epoch_millis || timestamp_ms > now_ms {
            return Err(Error::TimestampOutOfRange {
                timestamp_ms,
                epoch_ms: self.epoch_millis,
                now_ms,
            });
        }
        Ok(timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_clock::TestClock;

    const EPOCH_MS: i64 = 1_000;
    const NOW_MS: i64 = 50_000;

    fn decoder() -> Decoder<TestClock> {
        Decoder::with_clock(
            Timestamp::from_millisecond(EPOCH_MS).unwrap(),
            TestClock::from_millis(NOW_MS),
        )
        .unwrap()
    }

    #[test]
    fn recovers_hand_packed_fields() {
        let raw = SnowflakeId::from_parts(40_000, 9, 22, 1_234).as_u64();
        let decoder = decoder();

        let id = decoder.decode(raw);
        assert_eq!(id.worker_id(), 9);
        assert_eq!(id.process_id(), 22);
        assert_eq!(id.sequence(), 1_234);
        assert_eq!(
            decoder.extract_timestamp(raw).unwrap().as_millisecond(),
            41_000
        );
        assert!(decoder.is_valid(raw));
    }

    #[test]
    fn accepts_the_bounds() {
        let decoder = decoder();

        let at_epoch = SnowflakeId::from_parts(0, 0, 0, 0).as_u64();
        assert!(decoder.is_valid(at_epoch));
        assert_eq!(
            decoder.extract_timestamp(at_epoch).unwrap().as_millisecond(),
            EPOCH_MS
        );

        let at_now = SnowflakeId::from_parts((NOW_MS - EPOCH_MS) as u64, 0, 0, 0).as_u64();
        assert!(decoder.is_valid(at_now));
    }

    #[test]
    fn rejects_ids_from_the_future() {
        let decoder = decoder();
        let future = SnowflakeId::from_parts((NOW_MS - EPOCH_MS + 1) as u64, 1, 1, 0).as_u64();

        assert!(!decoder.is_valid(future));
        assert_eq!(
            decoder.extract_timestamp(future),
            Err(Error::TimestampOutOfRange {
                timestamp_ms: NOW_MS as u64 + 1,
                epoch_ms: EPOCH_MS as u64,
                now_ms: NOW_MS as u64,
            })
        );
        assert!(!decoder.is_valid(u64::MAX));
    }

    #[test]
    fn validates_decimal_strings() {
        let decoder = decoder();
        let raw = SnowflakeId::from_parts(10, 1, 1, 0).as_u64();

        assert!(decoder.is_valid_str(&raw.to_string()));
        assert!(!decoder.is_valid_str("invalid_id"));
        assert!(!decoder.is_valid_str(""));
        assert!(!decoder.is_valid_str("-42"));
        assert!(!decoder.is_valid_str(&u64::MAX.to_string()));
    }

    #[test]
    fn rejects_epoch_before_unix_epoch() {
        let epoch = Timestamp::from_millisecond(-1_000).unwrap();
        let result = Decoder::with_clock(epoch, TestClock::from_millis(NOW_MS));
        assert_eq!(result.err(), Some(Error::EpochBeforeUnix { epoch }));
    }

    #[test]
    fn default_decoder_uses_default_epoch() {
        let decoder = Decoder::default();
        assert_eq!(decoder.timestamp_millis(0), 1_420_070_400_000);
    }

    #[test]
    fn timestamp_millis_adds_epoch() {
        let decoder = decoder();
        assert_eq!(decoder.timestamp_millis(5 << TIMESTAMP_SHIFT), 1_005);
    }
}
