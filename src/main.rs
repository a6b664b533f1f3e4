//! Orchestrate CLI
//!
//! Command-line interface for walking Orchestrate listings

use clap::Parser;
use orchestrate_client::cli::{Cli, Runner};
use tracing::Level;

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for records
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
