//! Roster CLI - Reconcile BambooHR employee feeds into a roster and org hierarchy.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use roster::cli::{Cli, Commands, ConfigCommands, CredentialArgs};
use roster::commands::{self, CommandResult};
use roster::config::{ConfigOverrides, ResolvedConfig, resolve_config};
use roster::reconcile::RunClock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    init_logging(&cli.log_level);

    if let Err(e) = run_command(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Initialize stderr logging with the given filter, falling back to `warn`.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run_command(cli: Cli) -> Result<(), roster::Error> {
    let human = cli.human_readable;
    let config_path = cli.config_path;
    let clock = RunClock::now();

    match cli.command {
        Commands::Sync {
            output_dir,
            credentials,
        } => {
            let config = resolve(config_path, credentials, output_dir)?;
            let client = config.client()?;
            let result = commands::sync(&client, config.output_dir(), &clock)?;
            output(&result, human);
        }
        Commands::Employees { credentials } => {
            let client = resolve(config_path, credentials, None)?.client()?;
            output(&commands::employees(&client, &clock)?, human);
        }
        Commands::Hierarchy {
            input: Some(path),
            ..
        } => {
            output(&commands::hierarchy_from_file(&path)?, human);
        }
        Commands::Hierarchy {
            input: None,
            credentials,
        } => {
            let client = resolve(config_path, credentials, None)?.client()?;
            output(&commands::hierarchy(&client, &clock)?, human);
        }
        Commands::Fields { credentials } => {
            let client = resolve(config_path, credentials, None)?.client()?;
            output(&commands::fields(&client)?, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show { credentials } => {
                let config = resolve(config_path, credentials, None)?;
                output(&commands::config_show(&config), human);
            }
        },
    }

    Ok(())
}

/// Resolve configuration from CLI flags, environment, and roster.kdl.
fn resolve(
    config_path: Option<PathBuf>,
    credentials: CredentialArgs,
    output_dir: Option<PathBuf>,
) -> Result<ResolvedConfig, roster::Error> {
    let overrides = ConfigOverrides {
        config_path,
        company_domain: credentials.company_domain,
        api_key: credentials.api_key,
        output_dir,
    };
    resolve_config(&overrides)
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
