//! sdformat-mjcf CLI entry point.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::Cli;

/// Initialize the tracing subscriber for logging.
///
/// `--debug` forces debug output, otherwise `RUST_LOG` applies, defaulting
/// to info. Logs go to stderr so they never mix with converted output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("sdformat_mjcf=debug,sdformat_mjcf_core=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sdformat_mjcf=info,sdformat_mjcf_core=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("sdformat-mjcf starting with args: {:?}", cli);

    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
