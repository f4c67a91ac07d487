//! mdsync - sync personal markdown notes into a shared repository.

mod cli;
mod config;
mod logger;
mod note;
mod scan;
mod sync;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SyncConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SyncConfig::load(&cli)?;

    match &cli.command {
        Commands::Sync { verbose } => {
            logger::set_verbose(*verbose);
            cli::report::run_sync(&config, *verbose)
        }
        Commands::Status => cli::report::run_status(&config),
        Commands::Scan => cli::report::run_scan(&config),
        Commands::Clean => cli::report::run_clean(&config),
    }
}
