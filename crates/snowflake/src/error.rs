use jiff::Timestamp;
use thiserror::Error;

/// Errors returned by snowflake generation and decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid worker id {worker_id}; expected 0..={max_worker_id}")]
    InvalidWorkerId { worker_id: u8, max_worker_id: u8 },
    #[error("invalid process id {process_id}; expected 0..={max_process_id}")]
    InvalidProcessId { process_id: u8, max_process_id: u8 },
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
    #[error("epoch {epoch} is before the Unix epoch")]
    EpochBeforeUnix { epoch: Timestamp },
    #[error("overtime limit")]
    OverTimeLimit,
    #[error("clock did not advance past {last_millis}ms after {spins} re-reads")]
    ClockStalled { last_millis: u64, spins: u32 },
    #[error("generator state lock is poisoned")]
    StatePoisoned,
    #[error("invalid timestamp {timestamp_ms}ms; expected {epoch_ms}..={now_ms}")]
    TimestampOutOfRange {
        timestamp_ms: u64,
        epoch_ms: u64,
        now_ms: u64,
    },
    #[error("malformed snowflake: {0}")]
    Malformed(String),
    #[error("default generator is already initialized")]
    AlreadyInitialized,
}
