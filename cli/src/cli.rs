//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Temporary OpenStack instances with throwaway SSH keys
#[derive(Parser)]
#[command(
    name = "tins",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also honoured via `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new temporary instance
    Create(commands::create::CreateArgs),

    /// List temporary instances
    List,

    /// Connect to an instance over SSH
    Connect(commands::connect::ConnectArgs),

    /// Terminate one or all temporary instances
    Terminate(commands::terminate::TerminateArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            json,
        });

        match command {
            Command::Create(args) => commands::create::run(&app, args).await,
            Command::List => commands::list::run(&app).await,
            Command::Connect(args) => commands::connect::run(&app, args).await,
            Command::Terminate(args) => commands::terminate::run(&app, args).await,
            Command::Version => commands::version::run(&app),
        }
    }
}
