//! Per-user view state and the persisted city selection.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    city::DEFAULT_LOCATION,
    config::project_dirs,
    model::{LocationGuess, WeatherSnapshot},
    scenario::Scenario,
};

/// State persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "pixel-weather-selected-city", skip_serializing_if = "Option::is_none")]
    pub selected_city: Option<String>,
}

impl Session {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::session_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::session_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string(self).context("Failed to serialize session to TOML")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write session file: {}", path.display()))
    }

    pub fn session_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("session.toml"))
    }
}

/// City to query first: the saved selection, else the IP guess, else the capital.
pub fn initial_city(saved: Option<&str>, guess: Option<&LocationGuess>) -> String {
    saved
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .or_else(|| guess.map(|g| g.city.as_str()).filter(|c| !c.is_empty()))
        .unwrap_or(DEFAULT_LOCATION)
        .to_string()
}

/// What a front end is currently showing.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub selected_city: String,
    pub weather: Option<WeatherSnapshot>,
    pub override_weather: Option<WeatherSnapshot>,
}

impl AppState {
    pub fn new(selected_city: impl Into<String>) -> Self {
        Self { selected_city: selected_city.into(), ..Self::default() }
    }

    /// Switch city; the previous snapshot no longer applies.
    pub fn select_city(&mut self, city: impl Into<String>) {
        self.selected_city = city.into();
        self.weather = None;
    }

    /// Replace the live snapshot wholesale.
    pub fn update_weather(&mut self, snapshot: WeatherSnapshot) {
        self.weather = Some(snapshot);
    }

    pub fn apply_scenario(&mut self, scenario: Scenario) {
        self.override_weather = scenario.snapshot();
    }

    pub fn is_overridden(&self) -> bool {
        self.override_weather.is_some()
    }

    /// Snapshot to display: the override if any, else live weather.
    pub fn display(&self) -> Option<&WeatherSnapshot> {
        self.override_weather.as_ref().or(self.weather.as_ref())
    }
}
