use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{StartOptions, init_command, list_command, start_command};
use crate::config::Workspace;
use crate::utils::parse_script_choice;

#[derive(Parser, Debug)]
#[command(name = "service-runner")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Config file to use instead of searching for .service-runner.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered services and their runnable commands
    #[command(visible_alias = "ls")]
    List {
        /// Print the service descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select services and run them until Ctrl+C
    #[command(visible_alias = "s")]
    Start {
        /// Selection to use instead of prompting (e.g. "all", "1,3", "2-4")
        #[arg(short, long)]
        select: Option<String>,

        /// Command for a service with several runnable commands (SERVICE=COMMAND)
        #[arg(long = "script", value_name = "SERVICE=COMMAND", value_parser = parse_script_choice)]
        scripts: Vec<(String, String)>,

        /// Run the configured precondition without asking
        #[arg(long, conflicts_with = "skip_precondition")]
        precondition: bool,

        /// Never run the configured precondition
        #[arg(long)]
        skip_precondition: bool,

        /// Print the commands without starting anything
        #[arg(short, long)]
        dry_run: bool,

        /// Give up waiting for services to stop after this many milliseconds
        #[arg(long, value_name = "MS")]
        shutdown_timeout: Option<u64>,
    },
    /// Write a service-runner configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        let workspace = Workspace::load(self.cwd.as_deref(), self.config.as_deref())?;

        match self.command {
            Commands::List { json } => list_command(&workspace, json),
            Commands::Start {
                select,
                scripts,
                precondition,
                skip_precondition,
                dry_run,
                shutdown_timeout,
            } => {
                let precondition = match (precondition, skip_precondition) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                start_command(
                    &workspace,
                    StartOptions {
                        select,
                        scripts,
                        precondition,
                        dry_run,
                        shutdown_timeout,
                    },
                )
            }
            Commands::Init { force } => init_command(&workspace, force),
        }
    }
}
