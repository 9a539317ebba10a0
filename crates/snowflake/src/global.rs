//! A process-wide default generator for callers that don't want to wire one
//! up themselves.
//!
//! The default generator is created on first use with worker id
//! [`DEFAULT_WORKER_ID`] and process id [`DEFAULT_PROCESS_ID`]. Call
//! [`configure`] before the first [`generate`] to use other settings; once the
//! generator exists its settings can no longer change.

use crate::{
    clock::SystemClock,
    decoder::Decoder,
    error::Error,
    generator::{Snowflake, SnowflakeSettings},
    SnowflakeId,
};
use jiff::Timestamp;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_WORKER_ID: u8 = 1;
pub const DEFAULT_PROCESS_ID: u8 = 1;

static GENERATOR: OnceLock<Snowflake<SystemClock>> = OnceLock::new();

/// Installs the default generator. Fails with [`Error::AlreadyInitialized`]
/// once it has been configured or used.
pub fn configure(settings: SnowflakeSettings) -> Result<(), Error> {
    let generator = Snowflake::new(settings)?;
    GENERATOR
        .set(generator)
        .map_err(|_| Error::AlreadyInitialized)?;
    debug!(
        worker_id = settings.worker_id,
        process_id = settings.process_id,
        "configured default snowflake generator"
    );
    Ok(())
}

fn generator() -> Result<&'static Snowflake<SystemClock>, Error> {
    if let Some(generator) = GENERATOR.get() {
        return Ok(generator);
    }
    let settings = SnowflakeSettings::builder()
        .worker_id(DEFAULT_WORKER_ID)
        .process_id(DEFAULT_PROCESS_ID)
        .build();
    let generator = Snowflake::new(settings)?;
    Ok(GENERATOR.get_or_init(|| {
        debug!("initialized default snowflake generator");
        generator
    }))
}

/// Generates an id with the default generator.
pub fn generate() -> Result<SnowflakeId, Error> {
    generator()?.next_id()
}

pub fn is_valid(id: u64) -> bool {
    decoder().is_valid(id)
}

pub fn is_valid_str(id: &str) -> bool {
    decoder().is_valid_str(id)
}

pub fn extract_timestamp(id: u64) -> Result<Timestamp, Error> {
    decoder().extract_timestamp(id)
}

/// Decoder matching the default generator's epoch, without forcing its
/// creation. A configured epoch already passed the generator's checks.
fn decoder() -> Decoder<SystemClock> {
    GENERATOR
        .get()
        .and_then(|generator| Decoder::new(generator.start_epoch()).ok())
        .unwrap_or_default()
}
