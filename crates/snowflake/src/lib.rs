//! Time-sortable 64-bit ids in the Snowflake layout.
//!
//! Each id packs, from the most significant bit down, a 42-bit millisecond
//! offset from an epoch, a 5-bit worker id, a 5-bit process id and a 12-bit
//! per-millisecond sequence.

mod clock;
pub mod decoder;
pub mod error;
pub mod generator;
pub mod global;
mod id;

pub use clock::{Clock, SystemClock};
pub use decoder::Decoder;
pub use error::Error;
pub use generator::{Snowflake, SnowflakeSettings, DEFAULT_EPOCH, DEFAULT_MAX_CLOCK_SPINS};
pub use id::{
    SnowflakeId, MAX_PROCESS_ID, MAX_SEQUENCE, MAX_TIMESTAMP, MAX_WORKER_ID, TIMESTAMP_SHIFT,
};
