use std::io;

use anyhow::Result;
use clap::Parser;
use datafilter_cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, io::stdin().lock(), &mut out)
}

/// Logs go to stderr so they never mix with the filtered records.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
