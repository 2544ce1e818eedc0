use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use weathernow_core::{Config, ProviderId, WeatherSearch};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathernow", version, about = "Current weather for any city")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider.
    Configure {
        /// Provider short name: "weatherapi" or "googleplaces".
        provider: String,
    },

    /// Show current weather for a city and exit.
    Show {
        /// City name, e.g. "Paris".
        city: String,
    },

    /// Search repeatedly until Esc or Ctrl-C.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city } => {
                let mut search = search_from_config()?;
                search.set_query(city);
                let outcome = search.submit().await;
                print!("{}", render::frame(&mut search, &outcome, Utc::now()));
                Ok(())
            }
            Command::Interactive => interactive().await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if config.is_provider_configured(id) {
        println!("Replacing existing API key for {id}.");
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_validator(inquire::required!("API key must not be empty"))
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    let path = config.save()?;

    println!("Saved {id} credentials to {}", path.display());
    Ok(())
}

fn search_from_config() -> anyhow::Result<WeatherSearch> {
    let config = Config::load_effective()?;
    tracing::debug!(
        photos = config.is_provider_configured(ProviderId::GooglePlaces),
        "Configuration loaded"
    );
    WeatherSearch::from_config(&config)
}

async fn interactive() -> anyhow::Result<()> {
    let mut search = search_from_config()?;

    loop {
        let text = match Text::new("City:").with_placeholder("Enter city name").prompt() {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city name"),
        };

        search.set_query(text);
        let outcome = search.submit().await;
        print!("{}", render::frame(&mut search, &outcome, Utc::now()));
    }

    Ok(())
}
