// ABOUTME: userreg command-line front end
// ABOUTME: Argument parsing, logging setup and dispatch into the user store

pub mod commands;
pub mod config;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use userreg_config::RUST_LOG;

use commands::Commands;
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "userreg")]
#[command(about = "Register and authenticate users in a local SQLite database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the SQLite database file (overrides USERREG_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Password storage scheme: plaintext or argon2 (overrides USERREG_PASSWORD_SCHEME)
    #[arg(long, global = true)]
    pub password_scheme: Option<String>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Install the tracing subscriber on stderr.
/// Priority: RUST_LOG env var > verbose flag > default (warn)
pub fn init_logging(verbose: u8) {
    let filter = if std::env::var(RUST_LOG).is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Resolve configuration and run the parsed command.
pub async fn run(cli: Cli) -> Result<bool> {
    let config = Config::from_env()?.with_overrides(cli.db, cli.password_scheme.as_deref())?;
    cli.command.execute(&config).await
}
