//! Interactive session: the default mode when no subcommand is given.
//!
//! Restores the last viewed city on entry, then loops over the same actions
//! the one-shot subcommands expose, keeping state (shown city, unit) alive
//! between lookups.

use anyhow::Result;
use inquire::{CustomType, InquireError, Select, Text};
use skycast_core::{App, PreferenceStore, Unit};

use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    Locate,
    OpenFavorite,
    AddFavorite,
    RemoveFavorite,
    ToggleUnit,
    Quit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Action::Search => "Search for a city",
            Action::Locate => "Use coordinates",
            Action::OpenFavorite => "Open a favorite",
            Action::AddFavorite => "Save a favorite",
            Action::RemoveFavorite => "Remove a favorite",
            Action::ToggleUnit => "Toggle metric/imperial",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

pub async fn run(mut app: App) -> Result<()> {
    if app.prefs().last_city().is_some() {
        output::loading("Restoring your last city...");
        if let Some(outcome) = app.startup().await {
            output::print_outcome(&outcome);
        }
    }

    loop {
        let choice = match Select::new("What next?", menu(&app)).prompt() {
            Ok(action) => action,
            // Esc / Ctrl-C at the menu ends the session, not the process.
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match choice {
            Action::Search => {
                let city = Text::new("City name:").prompt()?;
                output::loading(&format!("Fetching weather for {}...", city.trim()));
                let outcome = app.search(&city).await;
                output::print_outcome(&outcome);
            }
            Action::Locate => {
                let latitude: f64 = CustomType::new("Latitude:").prompt()?;
                let longitude: f64 = CustomType::new("Longitude:").prompt()?;
                output::loading("Fetching weather for your location...");
                let outcome = app.locate(latitude, longitude).await;
                output::print_outcome(&outcome);
            }
            Action::OpenFavorite => {
                let choice = Select::new("Open favorite:", app.favorites()).raw_prompt()?;
                output::loading(&format!("Fetching weather for {}...", choice.value));
                let outcome = app.open_favorite(choice.index).await;
                output::print_outcome(&outcome);
            }
            Action::AddFavorite => {
                let city = Text::new("City to save:").prompt()?;
                app.add_favorite(&city)?;
            }
            Action::RemoveFavorite => {
                let choice = Select::new("Remove favorite:", app.favorites()).raw_prompt()?;
                app.remove_favorite(choice.index)?;
                println!("Removed {}.", choice.value);
            }
            Action::ToggleUnit => {
                let unit = other_unit(app.unit());
                output::loading(&format!("Switching to {unit}..."));
                match app.set_unit(unit).await? {
                    Some(outcome) => output::print_outcome(&outcome),
                    None => println!("Display units set to {unit}."),
                }
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn menu(app: &App) -> Vec<Action> {
    let mut actions = vec![Action::Search, Action::Locate];
    if !app.favorites().is_empty() {
        actions.push(Action::OpenFavorite);
        actions.push(Action::RemoveFavorite);
    }
    actions.push(Action::AddFavorite);
    actions.push(Action::ToggleUnit);
    actions.push(Action::Quit);
    actions
}

fn other_unit(unit: Unit) -> Unit {
    match unit {
        Unit::Metric => Unit::Imperial,
        Unit::Imperial => Unit::Metric,
    }
}
