mod cli;

use crate::cli::{Command, GenerateArgs, InspectArgs, CLI};
use anyhow::{bail, Context};
use clap::Parser;
use snowflake::{global, Decoder, SnowflakeId, SnowflakeSettings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout carries ids only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = CLI::parse();

    match config.command {
        Command::Generate(args) => generate(args),
        Command::Inspect(args) => inspect(args),
    }
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    info!(
        worker_id = args.worker_id,
        process_id = args.process_id,
        epoch = %args.epoch,
        count = args.count,
        "generating snowflake ids"
    );

    let settings = SnowflakeSettings::builder()
        .worker_id(args.worker_id)
        .process_id(args.process_id)
        .start_epoch(args.epoch)
        .build();
    global::configure(settings).context("failed to configure generator")?;

    for _ in 0..args.count {
        let id = global::generate().context("failed to generate id")?;
        println!("{id}");
    }

    Ok(())
}

fn inspect(args: InspectArgs) -> anyhow::Result<()> {
    let decoder = Decoder::new(args.epoch).context("invalid epoch")?;
    let mut invalid = 0_usize;

    for raw in &args.ids {
        let id = match raw.parse::<SnowflakeId>() {
            Ok(id) => id,
            Err(err) => {
                warn!(id = %raw, error = %err, "not a snowflake");
                println!("{raw}\tvalid=false");
                invalid += 1;
                continue;
            }
        };

        let value = id.as_u64();
        let valid = decoder.is_valid(value);
        let timestamp = match decoder.extract_timestamp(value) {
            Ok(timestamp) => timestamp.to_string(),
            Err(err) => {
                warn!(id = value, error = %err, "timestamp out of range");
                format!("{}ms", decoder.timestamp_millis(value))
            }
        };
        println!(
            "{value}\ttimestamp={timestamp}\tworker_id={}\tprocess_id={}\tsequence={}\tvalid={valid}",
            id.worker_id(),
            id.process_id(),
            id.sequence(),
        );
        if !valid {
            invalid += 1;
        }
    }

    if invalid > 0 {
        bail!("{invalid} of {} ids are invalid", args.ids.len());
    }
    Ok(())
}
