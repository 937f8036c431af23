//! Ballerina bridge CLI entry point.

use ballerina_bridge::cli::{self, Cli, EXIT_ERROR};
use clap::Parser;
use std::io::Write;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Logs go to stderr; stdout carries only the report
    let filter = EnvFilter::try_from_env("BRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    let mut exit_code = match cli::run(&cli, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    if let Err(e) = stdout.flush() {
        eprintln!("Error: cannot write report: {}", e);
        exit_code = EXIT_ERROR;
    }
    drop(stdout);
    std::process::exit(exit_code);
}
