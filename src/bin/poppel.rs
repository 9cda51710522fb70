//! Poppel CLI Binary
//!
//! Command-line interface for poppel array stores.

use anyhow::Context;
use clap::Parser;
use poppel::logging::init_logging;
use poppel::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: Cli) -> anyhow::Result<String> {
    let context = CliContext::new(cli.config.clone()).context("Error loading configuration")?;

    let mut logging = context.config().logging.clone();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    init_logging(Some(&logging)).context("Error initializing logging")?;

    let output = context.execute(&cli.command)?;
    Ok(output)
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
