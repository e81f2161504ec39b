//! CLI commands

mod completion;
mod run;
mod seed;

pub use completion::CompletionCommand;
pub use run::RunCommand;
pub use seed::SeedCommand;

use clap::{Parser, Subcommand, ValueEnum};

/// authgate - Authentication API over a primary/replica PostgreSQL pair
#[derive(Parser, Debug)]
#[command(name = "authgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the authgate server
    Run(RunCommand),

    /// Insert or update the initial users on the primary
    Seed(SeedCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completion(CompletionCommand),
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
