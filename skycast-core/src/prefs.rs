//! User preference persistence: unit, favorite cities, last viewed city.
//!
//! Three independent records behind one trait. Reads fall back to defaults
//! when the stored data is missing or unparsable; every mutation writes the
//! full current state back immediately.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, path::PathBuf};

use crate::model::Unit;

/// Storage capability for user preferences.
///
/// Injected into the orchestration layer so tests can substitute
/// [`MemoryPrefs`] for the on-disk store.
pub trait PreferenceStore: Send + Sync + Debug {
    fn unit(&self) -> Unit;
    fn set_unit(&mut self, unit: Unit) -> Result<()>;

    /// Favorites in insertion order.
    fn favorites(&self) -> Vec<String>;
    /// Append `name` unless it is already present. Idempotent.
    fn add_favorite(&mut self, name: &str) -> Result<()>;
    /// Remove the favorite at `index`, preserving the order of the rest.
    fn remove_favorite(&mut self, index: usize) -> Result<()>;

    /// The most recently successfully displayed city, if any.
    fn last_city(&self) -> Option<String>;
    fn set_last_city(&mut self, city: &str) -> Result<()>;
}

/// On-disk serialized form. Each field falls back independently, so a file
/// written by an older build still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefsData {
    #[serde(default)]
    unit: Unit,
    #[serde(default)]
    favorites: Vec<String>,
    #[serde(default)]
    last_city: Option<String>,
}

impl PrefsData {
    fn add_favorite(&mut self, name: &str) -> bool {
        if self.favorites.iter().any(|f| f == name) {
            return false;
        }
        self.favorites.push(name.to_string());
        true
    }

    fn remove_favorite(&mut self, index: usize) -> Result<()> {
        if index >= self.favorites.len() {
            return Err(anyhow!(
                "No favorite at position {index} ({} stored).",
                self.favorites.len()
            ));
        }
        self.favorites.remove(index);
        Ok(())
    }
}

/// Preferences persisted as a TOML file under the platform config directory.
#[derive(Debug)]
pub struct FilePrefs {
    path: PathBuf,
    data: PrefsData,
}

impl FilePrefs {
    /// Open the store at the default platform location.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::prefs_file_path()?)
    }

    /// Open the store at an explicit path. A missing or unparsable file
    /// loads as defaults rather than failing.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => PrefsData::default(),
        };

        Ok(Self { path, data })
    }

    /// Path to the preferences file.
    pub fn prefs_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("prefs.toml"))
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(&self.data)
            .context("Failed to serialize preferences to TOML")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write preferences file: {}", self.path.display()))
    }
}

impl PreferenceStore for FilePrefs {
    fn unit(&self) -> Unit {
        self.data.unit
    }

    fn set_unit(&mut self, unit: Unit) -> Result<()> {
        self.data.unit = unit;
        self.save()
    }

    fn favorites(&self) -> Vec<String> {
        self.data.favorites.clone()
    }

    fn add_favorite(&mut self, name: &str) -> Result<()> {
        if self.data.add_favorite(name) {
            self.save()?;
        }
        Ok(())
    }

    fn remove_favorite(&mut self, index: usize) -> Result<()> {
        self.data.remove_favorite(index)?;
        self.save()
    }

    fn last_city(&self) -> Option<String> {
        self.data.last_city.clone()
    }

    fn set_last_city(&mut self, city: &str) -> Result<()> {
        self.data.last_city = Some(city.to_string());
        self.save()
    }
}

/// In-memory store with the same semantics as [`FilePrefs`].
///
/// Used by tests; also suits embeddings that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    data: PrefsData,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_city(city: &str) -> Self {
        let mut prefs = Self::default();
        prefs.data.last_city = Some(city.to_string());
        prefs
    }
}

impl PreferenceStore for MemoryPrefs {
    fn unit(&self) -> Unit {
        self.data.unit
    }

    fn set_unit(&mut self, unit: Unit) -> Result<()> {
        self.data.unit = unit;
        Ok(())
    }

    fn favorites(&self) -> Vec<String> {
        self.data.favorites.clone()
    }

    fn add_favorite(&mut self, name: &str) -> Result<()> {
        self.data.add_favorite(name);
        Ok(())
    }

    fn remove_favorite(&mut self, index: usize) -> Result<()> {
        self.data.remove_favorite(index)
    }

    fn last_city(&self) -> Option<String> {
        self.data.last_city.clone()
    }

    fn set_last_city(&mut self, city: &str) -> Result<()> {
        self.data.last_city = Some(city.to_string());
        Ok(())
    }
}
