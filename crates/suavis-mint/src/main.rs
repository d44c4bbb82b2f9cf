#![doc = include_str!("../README.md")]

mod config;
mod mint;
mod telemetry;

use clap::Parser;
use config::{CliArgs, Command, MintConfig};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = MintConfig::try_from(args)?;

    init_telemetry(config.log_format)?;

    match config.command {
        Command::Mint {
            count,
            threads,
            format,
        } => {
            let allocator = mint::build_allocator(&config);
            let ids = mint::mint(allocator.as_ref(), count, threads)?;
            mint::write_ids(&ids, format, config.epoch)
        }
        Command::Inspect { id, json } => mint::inspect(id, json, config.epoch),
    }
}
