//! Member portal CLI

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use portal_http::{ClientError, FileTokenStore, PortalClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Register, sign in and manage your member profile")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Timeout for requests in seconds (0 = no timeout), overrides the configuration
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.log_level.clone().into(), cli.json_logs) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = config::CliConfig::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    debug!(?config, "Loaded configuration");

    let tokens = FileTokenStore::new(config.resolved_token_path());
    let mut builder = PortalClient::builder()
        .base_url(&config.api_url)
        .token_store(Arc::new(tokens));
    if config.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.timeout_secs));
    }
    let client = builder.build()?;

    cli.command.execute(&client, &mut std::io::stdout()).await
}

/// Print a failure the way a form would show it
fn report(e: &anyhow::Error) {
    let Some(client_error) = e.downcast_ref::<ClientError>() else {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        return;
    };

    error!("Command failed: {client_error}");
    match client_error {
        ClientError::Validation(errors) => {
            for (field, messages) in errors.iter() {
                for message in messages {
                    eprintln!("{field}: {message}");
                }
            }
        }
        ClientError::Unauthorized(_) => {
            eprintln!("{}", client_error.user_message());
            eprintln!("Run `portal login` to sign in again.");
        }
        ClientError::Network(_) => {
            eprintln!("{}", client_error.user_message());
            eprintln!("({client_error})");
        }
        _ => eprintln!("Error: {}", client_error.user_message()),
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_profile_update_flags() {
        let cli = Cli::try_parse_from([
            "portal",
            "--api-url",
            "http://localhost:9000",
            "profile",
            "update",
            "--first-name",
            "Alice",
            "--replace",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Commands::Profile {
                command:
                    commands::ProfileCommands::Update {
                        first_name,
                        replace,
                        username,
                        ..
                    },
            } => {
                assert_eq!(first_name.as_deref(), Some("Alice"));
                assert!(replace);
                assert_eq!(username, None);
            }
            _ => panic!("expected profile update"),
        }
    }

    #[test]
    fn login_takes_password_flag() {
        let cli =
            Cli::try_parse_from(["portal", "login", "-u", "alice", "-p", "longenough1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Login { ref username, .. } if username == "alice"
        ));
    }
}
