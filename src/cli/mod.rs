//! CLI argument definitions for Roster.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Roster - Reconcile BambooHR employee data into a roster and org hierarchy.
///
/// Credentials come from `--domain`/`--api-key`, the `BAMBOO_COMPANY_DOMAIN`
/// and `BAMBOO_API_KEY` environment variables, or roster.kdl.
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about = "Reconcile BambooHR employee feeds into a roster and org hierarchy", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Path to a roster.kdl config file
    #[arg(short = 'c', long = "config", global = true, env = "ROSTER_CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive)
    #[arg(long, global = true, env = "ROSTER_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Credential overrides shared by commands that talk to BambooHR.
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// BambooHR company subdomain
    #[arg(long = "domain")]
    pub company_domain: Option<String>,

    /// BambooHR API key
    #[arg(long)]
    pub api_key: Option<String>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, reconcile, and write employees.json and hierarchy.json
    Sync {
        /// Directory to write into (default: ./finalData)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Fetch and reconcile, then print the roster
    Employees {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Print the management hierarchy
    ///
    /// With --input, builds the hierarchy offline from a previously written
    /// employees.json instead of fetching.
    Hierarchy {
        /// Read employees from this JSON file instead of fetching
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// List available remote fields and the subset that will be requested
    Fields {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}
