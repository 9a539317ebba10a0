use crate::error::Error;
use modular_bitfield::prelude::*;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const TIMESTAMP_BITS: u32 = 42;
pub const WORKER_ID_BITS: u32 = 5;
pub const PROCESS_ID_BITS: u32 = 5;
pub const SEQUENCE_BITS: u32 = 12;

pub const MAX_TIMESTAMP: u64 = (1_u64 << TIMESTAMP_BITS) - 1;
pub const MAX_WORKER_ID: u8 = (1_u8 << WORKER_ID_BITS) - 1;
pub const MAX_PROCESS_ID: u8 = (1_u8 << PROCESS_ID_BITS) - 1;
pub const MAX_SEQUENCE: u16 = (1_u16 << SEQUENCE_BITS) - 1;

/// Right shift that moves the timestamp field down to bit 0.
pub const TIMESTAMP_SHIFT: u32 = WORKER_ID_BITS + PROCESS_ID_BITS + SEQUENCE_BITS;

/// A packed 64-bit snowflake.
///
/// Fields are declared least significant first, so the numeric value reads
/// `timestamp | worker_id | process_id | sequence` from the top bit down and
/// ids compare in generation order.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnowflakeId {
    /// 12 bits for sequence number (resets every millisecond).
    pub sequence: B12,
    /// 5 bits for process ID.
    pub process_id: B5,
    /// 5 bits for worker ID.
    pub worker_id: B5,
    /// 42 bits for timestamp (milliseconds since a custom epoch).
    pub timestamp: B42,
}

impl SnowflakeId {
    /// Packs the four fields, keeping only the low bits that fit each one.
    pub fn from_parts(timestamp: u64, worker_id: u8, process_id: u8, sequence: u16) -> Self {
        Self::new()
            .with_timestamp(timestamp & MAX_TIMESTAMP)
            .with_worker_id(worker_id & MAX_WORKER_ID)
            .with_process_id(process_id & MAX_PROCESS_ID)
            .with_sequence(sequence & MAX_SEQUENCE)
    }

    pub fn as_u64(self) -> u64 {
        u64::from_le_bytes(self.into_bytes())
    }
}

impl From<u64> for SnowflakeId {
    fn from(value: u64) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.as_u64()
    }
}

impl PartialOrd for SnowflakeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SnowflakeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_u64().cmp(&other.as_u64())
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("timestamp", &self.timestamp())
            .field("worker_id", &self.worker_id())
            .field("process_id", &self.process_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

impl FromStr for SnowflakeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self::from)
            .map_err(|err| Error::Malformed(format!("{s:?}: {err}")))
    }
}
