//! Forcepull binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use forcepull::AppError;
use forcepull_infrastructure::Settings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch Salesforce records with a stored `OAuth2` credential.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Settings file (defaults to ./forcepull.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove the stored credential of the configured user
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the table
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitCode, AppError> {
    let settings = Settings::load(cli.config.as_deref())?;
    settings.validate()?;

    match cli.command {
        Some(Command::Logout) => {
            forcepull::logout(&settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            tracing::info!("Starting Forcepull v{}", env!("CARGO_PKG_VERSION"));
            let outcome = forcepull::run(&settings).await?;
            tracing::info!(state = %outcome.state(), "run finished");
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
