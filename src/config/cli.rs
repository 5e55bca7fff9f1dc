use crate::config::Environment;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "rekognizer")]
#[command(about = "Face verification and recognition service")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/rekognizer.toml")]
    pub config: String,

    /// Override the environment from the config file
    #[arg(long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Override server.bind_address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Manage the database schema
    Migrate {
        #[command(subcommand)]
        action: MigrateCommand,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[derive(Debug, Clone, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Up,

    /// Revert migrations down to a version (default: revert the latest one)
    Down {
        #[arg(long)]
        target: Option<i64>,
    },
}
