// ABOUTME: CLI subcommands for the user store
// ABOUTME: init, add, auth and list map one-to-one onto UserStore operations

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::*;
use inquire::{Password, PasswordDisplayMode};
use tracing::debug;
use userreg_storage::UserStore;

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database file and the users table
    Init,
    /// Register a new user
    Add {
        username: String,
        email: String,
        /// Password; prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Check a username and password
    Auth {
        username: String,
        /// Password; prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List registered users
    List,
}

impl Commands {
    /// Run the command. `Ok(false)` is a normal failure (duplicate username,
    /// rejected credentials) that should become a non-zero exit code.
    pub async fn execute(&self, config: &Config) -> Result<bool> {
        debug!("Using database at {}", config.db_path.display());

        let store = UserStore::open(config.store_config())
            .await
            .with_context(|| format!("Failed to open {}", config.db_path.display()))?;

        let outcome = match self {
            Commands::Init => init_command(&store, config).await,
            Commands::Add {
                username,
                email,
                password,
            } => add_command(&store, username, email, password.as_deref()).await,
            Commands::Auth { username, password } => {
                auth_command(&store, username, password.as_deref()).await
            }
            Commands::List => list_command(&store).await,
        };

        store.close().await;
        outcome
    }
}

async fn init_command(store: &UserStore, config: &Config) -> Result<bool> {
    store.initialize().await?;
    println!(
        "{} User database ready at {}",
        "✓".green().bold(),
        config.db_path.display()
    );
    Ok(true)
}

async fn add_command(
    store: &UserStore,
    username: &str,
    email: &str,
    password: Option<&str>,
) -> Result<bool> {
    ensure_initialized(store).await?;
    let password = resolve_password(password, true)?;

    if store.add_user(username, email, &password).await? {
        println!("{} Registered user '{}'", "✓".green().bold(), username);
        Ok(true)
    } else {
        eprintln!(
            "{} Username '{}' is already taken",
            "✗".red().bold(),
            username
        );
        Ok(false)
    }
}

async fn auth_command(store: &UserStore, username: &str, password: Option<&str>) -> Result<bool> {
    ensure_initialized(store).await?;
    let password = resolve_password(password, false)?;

    if store.authenticate_user(username, &password).await? {
        println!("{} Authenticated '{}'", "✓".green().bold(), username);
        Ok(true)
    } else {
        eprintln!("{} Invalid username or password", "✗".red().bold());
        Ok(false)
    }
}

async fn list_command(store: &UserStore) -> Result<bool> {
    ensure_initialized(store).await?;
    store.display_users().await?;
    Ok(true)
}

async fn ensure_initialized(store: &UserStore) -> Result<()> {
    if !store.table_exists().await? {
        bail!(
            "User database is not initialized; run `{}` first",
            "userreg init".yellow()
        );
    }
    Ok(())
}

fn resolve_password(given: Option<&str>, confirm: bool) -> Result<String> {
    if let Some(password) = given {
        return Ok(password.to_string());
    }

    let mut prompt = Password::new("Password:").with_display_mode(PasswordDisplayMode::Masked);
    if !confirm {
        prompt = prompt.without_confirmation();
    }
    prompt.prompt().context("Password input cancelled")
}
