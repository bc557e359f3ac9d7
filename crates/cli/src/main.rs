use anyhow::Result;
use clap::Parser;
use service_runner::Cli;
use std::io::IsTerminal;

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var; stdout belongs to the services
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    Cli::parse().execute()
}
