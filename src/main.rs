//! tasklist CLI
//!
//! Add, complete, and delete short text tasks from the command line or an
//! interactive terminal list.

use clap::Parser;
use tasklist::cli::Cli;
use tasklist::output::print_error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();

    // Tracing is opt-in via RUST_LOG (or --verbose when RUST_LOG is unset).
    // Ignore invalid/huge filters rather than failing startup.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(if cli.verbose { "tasklist=debug" } else { "off" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let command = cli.command.name();
    let json = cli.json;
    if let Err(err) = cli.run() {
        print_error(command, &err, json);
        std::process::exit(err.exit_code());
    }
}
