use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use investment_stats::cli::Cli;
use investment_stats::dispatcher::dispatch_command;

fn main() -> Result<()> {
    // Logs go to stderr and stay quiet unless RUST_LOG asks for more
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatch_command(&cli.command, cli.config.as_deref(), cli.json)
}
