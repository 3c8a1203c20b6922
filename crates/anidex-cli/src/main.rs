mod cli;
mod commands;
mod render;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use anidex_core::config::AppConfig;
use anidex_runtime::Runtime;

use crate::cli::Cli;
use crate::commands::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "anidex=debug" } else { "anidex=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(db) = cli.db {
        config.storage.path = Some(db);
    }

    let mut rt = Runtime::open(config)?;
    commands::run(&mut rt, cli.command).await
}
