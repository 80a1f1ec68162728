use std::{path::PathBuf, sync::OnceLock};

use clap::Parser;

/// Export Docker container health and resource usage as OTLP gauge metrics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to an env file loaded before reading configuration.
    /// Without this flag, a `.env` in the working directory is used if present.
    #[arg(short, long)]
    pub env_file: Option<PathBuf>,

    /// Override the poll interval in seconds.
    #[arg(short, long)]
    pub interval: Option<u64>,
}

static ARGS: OnceLock<Args> = OnceLock::new();

pub fn get_cli_args() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}
