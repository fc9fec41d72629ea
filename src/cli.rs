//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Config Distro - Merge upstream configuration into customized sites
#[derive(Parser, Debug)]
#[command(name = "config-distro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Three-way merge an upstream export into the active configuration
    Merge(commands::merge::MergeArgs),

    /// List the config items ignored for a direction and operation
    Ignored(commands::ignored::IgnoredArgs),

    /// Import a distribution, keeping ignored and retained items
    Filter(commands::filter::FilterArgs),

    /// Print the content hash of a config item
    Hash(commands::hash::HashArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Merge(args) => commands::merge::execute(args, &self.color),
            Commands::Ignored(args) => commands::ignored::execute(args, &self.color),
            Commands::Filter(args) => commands::filter::execute(args, &self.color),
            Commands::Hash(args) => commands::hash::execute(args),
        }
    }
}

/// Log to stderr at `level`; `RUST_LOG` takes precedence when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
