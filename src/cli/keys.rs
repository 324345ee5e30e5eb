//! Scraper key CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_key_status;
use crate::error::CuadreResult;
use crate::keys::{KeyRegistry, ScraperApiClient};
use crate::models::ScraperKey;
use crate::storage::Storage;

/// Key subcommands
#[derive(Subcommand)]
pub enum KeyCommands {
    /// Register a new key
    Add {
        key: String,
    },
    /// Print the next key to use and charge one request to it
    Acquire,
    /// Record a failed request against a key
    Error {
        key: String,
    },
    /// Move away from a key, optionally recording a failure
    Rotate {
        key: String,
        /// The current key just failed
        #[arg(short, long)]
        error: bool,
    },
    /// Take a key out of rotation
    Deactivate {
        key: String,
    },
    /// Show usage and health of every key
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Monthly reset from the provider's real credit counts
    Reset,
    /// Align usage with the provider without resetting
    Sync,
}

fn print_keys(keys: &[ScraperKey]) {
    for key in keys {
        println!(
            "  {}  usage {:>4}  credits {:>5}  {}",
            key.masked(),
            key.usage,
            key.real_credits
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            if key.active { "active" } else { "inactive" }
        );
    }
}

/// Handle a key command
pub fn handle_key_command(storage: &Storage, settings: &Settings, cmd: KeyCommands) -> CuadreResult<()> {
    let registry = KeyRegistry::new(storage.paths(), settings.key_policy.clone());

    match cmd {
        KeyCommands::Add { key } => {
            let added = registry.add(&key)?;
            println!("Added key {}", added.masked());
        }

        KeyCommands::Acquire => {
            println!("{}", registry.acquire()?);
        }

        KeyCommands::Error { key } => {
            let updated = registry.mark_error(&key)?;
            println!(
                "Key {}: {} consecutive error(s){}",
                updated.masked(),
                updated.consecutive_errors,
                if updated.active { "" } else { ", disabled" }
            );
        }

        KeyCommands::Rotate { key, error } => {
            println!("{}", registry.rotate(&key, error)?);
        }

        KeyCommands::Deactivate { key } => {
            let updated = registry.deactivate(&key)?;
            println!("Deactivated key {}", updated.masked());
        }

        KeyCommands::Status { json } => {
            let status = registry.status()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!("{}", format_key_status(&status));
            }
        }

        KeyCommands::Reset => {
            let client = ScraperApiClient::new(&settings.credits_api_url)?;
            let keys = registry.reset_monthly(&client)?;
            println!("Monthly reset completed for {} key(s)", keys.len());
            print_keys(&keys);
        }

        KeyCommands::Sync => {
            let client = ScraperApiClient::new(&settings.credits_api_url)?;
            let keys = registry.sync(&client)?;
            println!("Synchronized {} key(s)", keys.len());
            print_keys(&keys);
        }
    }

    Ok(())
}
