use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;

pub const WORKER_ID_ENV: &str = "SNOWFLAKE_WORKER_ID";
pub const PROCESS_ID_ENV: &str = "SNOWFLAKE_PROCESS_ID";
pub const EPOCH_ENV: &str = "SNOWFLAKE_EPOCH";

pub const DEFAULT_WORKER_ID: &str = "1";
pub const DEFAULT_PROCESS_ID: &str = "1";
pub const DEFAULT_EPOCH: &str = "2015-01-01T00:00:00Z";

#[derive(Debug, Parser)]
#[command(name = "snowflake", about = "Generate and inspect snowflake ids")]
pub struct CLI {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print freshly generated ids, one per line.
    Generate(GenerateArgs),
    /// Print the fields of existing ids and whether they are valid.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(long, env = WORKER_ID_ENV, default_value = DEFAULT_WORKER_ID)]
    pub worker_id: u8,

    #[arg(long, env = PROCESS_ID_ENV, default_value = DEFAULT_PROCESS_ID)]
    pub process_id: u8,

    #[arg(long, env = EPOCH_ENV, default_value = DEFAULT_EPOCH)]
    pub epoch: Timestamp,

    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[arg(required = true)]
    pub ids: Vec<String>,

    #[arg(long, env = EPOCH_ENV, default_value = DEFAULT_EPOCH)]
    pub epoch: Timestamp,
}
