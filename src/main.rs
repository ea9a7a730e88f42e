//! Command line entry point for englid.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use englid::cli::{self, Cli};
use englid::logging::{self, LogOptions};

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = logging::init(LogOptions { quiet: args.quiet }) {
        eprintln!("Logging disabled: {err}");
    }

    let stdin = io::stdin();
    match cli::run(&args, stdin.lock(), io::stdout()) {
        Ok(summary) => {
            tracing::debug!("Run finished: {summary:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
