use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::convert::TryFrom;

use skycast_core::{App, Config, FilePrefs, OpenWeatherProvider, PreferenceStore, Unit};

use crate::{output, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather lookup from the terminal")]
pub struct Cli {
    /// Command to run; an interactive session starts when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store your OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,
    },

    /// Show current weather for coordinates, e.g. from a GPS fix.
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Manage favorite cities. Works without an API key.
    #[command(subcommand)]
    Fav(FavCommand),

    /// Switch between metric and imperial display.
    Unit {
        /// "metric" or "imperial".
        unit: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavCommand {
    /// List favorites in order.
    List,
    /// Save a city. Does nothing if it is already saved.
    Add { city: String },
    /// Remove the favorite at the given position (1-based, as listed).
    Remove { position: usize },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Fav(action)) => fav(action),
            Some(Command::Unit { unit }) => set_unit(&unit),
            Some(Command::Show { city }) => {
                let mut app = build_app()?;
                output::loading(&format!("Fetching weather for {}...", city.trim()));
                let outcome = app.search(&city).await;
                output::print_outcome(&outcome);
                Ok(())
            }
            Some(Command::Locate { lat, lon }) => {
                let mut app = build_app()?;
                output::loading("Fetching weather for your location...");
                let outcome = app.locate(lat, lon).await;
                output::print_outcome(&outcome);
                Ok(())
            }
            None => session::run(build_app()?).await,
        }
    }
}

/// Wire the application from stored credentials and preferences.
fn build_app() -> Result<App> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?.to_string();
    let prefs = FilePrefs::open_default()?;

    Ok(App::new(
        Box::new(OpenWeatherProvider::new(api_key)),
        Box::new(prefs),
    ))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty.");
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn fav(action: FavCommand) -> Result<()> {
    let mut prefs = FilePrefs::open_default()?;

    match action {
        FavCommand::List => {
            let favorites = prefs.favorites();
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for (i, city) in favorites.iter().enumerate() {
                println!("{}. {city}", i + 1);
            }
        }
        FavCommand::Add { city } => {
            let city = city.trim();
            if city.is_empty() {
                bail!("City name must not be empty.");
            }
            prefs.add_favorite(city)?;
            println!("Saved {city}.");
        }
        FavCommand::Remove { position } => {
            let index = position
                .checked_sub(1)
                .ok_or_else(|| anyhow!("Positions are 1-based; run `skycast fav list`."))?;
            prefs.remove_favorite(index)?;
            println!("Removed favorite {position}.");
        }
    }

    Ok(())
}

fn set_unit(value: &str) -> Result<()> {
    let unit = Unit::try_from(value)?;

    let mut prefs = FilePrefs::open_default()?;
    prefs.set_unit(unit)?;

    println!("Display units set to {unit}.");
    Ok(())
}
