use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pixel_weather_core::{
    AppState, Config, LocationService, Scenario, Session, WeatherService,
    provider::{forecast_source_from_config, locator_from_config},
    session::initial_city,
};
use tracing::{debug, info};

use crate::{render, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pixel-weather", version, about = "Pixel weather server and CLI")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server exposing /api/weather and /api/location.
    Serve {
        /// Address to listen on, e.g. "127.0.0.1:3000".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the CWA open-data API key.
    Configure,

    /// Show weather for a city as a dialog box.
    Show {
        /// City name in any common spelling; defaults to the last selection or your IP location.
        city: Option<String>,

        /// Replace live weather with a debug scenario (sunny, rain, heavy-rain, snow, windy, night, reset).
        #[arg(long)]
        scenario: Option<String>,

        /// Print the snapshot as JSON instead of the dialog box.
        #[arg(long)]
        json: bool,

        /// List supported cities and exit.
        #[arg(long)]
        list: bool,
    },

    /// Guess a location from an IP address (your own if omitted).
    Locate {
        ip: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = self.config_path()?;
        let config = Config::load_from(&config_path)?;

        match self.command {
            Command::Serve { bind } => {
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                if config.api_key().is_none() {
                    tracing::warn!("no CWA API key configured; /api/weather will serve defaults");
                }
                let state = server::ServerState::new(
                    WeatherService::new(forecast_source_from_config(&config)?),
                    LocationService::new(locator_from_config(&config)?),
                );
                server::serve(&bind, state).await
            }
            Command::Configure => configure(config, &config_path),
            Command::Show { city, scenario, json, list } => {
                if list {
                    println!("{}", render::city_list());
                    return Ok(());
                }
                let scenario = scenario.as_deref().map(str::parse::<Scenario>).transpose()?;
                show(&config, city, scenario, json).await
            }
            Command::Locate { ip } => {
                let locations = LocationService::new(locator_from_config(&config)?);
                let guess = locations.locate(ip.as_deref().unwrap_or_default()).await;
                println!("{}", serde_json::to_string_pretty(&guess)?);
                Ok(())
            }
        }
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path(),
        }
    }
}

fn configure(mut config: Config, path: &std::path::Path) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("CWA open-data API key:")
        .without_confirmation()
        .with_help_message("Get one at https://opendata.cwa.gov.tw/user/authkey")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(
    config: &Config,
    city: Option<String>,
    scenario: Option<Scenario>,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = Session::load()?;

    let selected = match city {
        Some(city) => {
            session.selected_city = Some(city.clone());
            session.save()?;
            city
        }
        None if session.selected_city.is_some() => initial_city(session.selected_city.as_deref(), None),
        None => {
            let locations = LocationService::new(locator_from_config(config)?);
            let guess = locations.locate("").await;
            debug!(city = %guess.city, "seeded city from IP location");
            initial_city(None, Some(&guess))
        }
    };

    let mut state = AppState::new(selected);
    if let Some(scenario) = scenario {
        state.apply_scenario(scenario);
    }

    if !state.is_overridden() {
        let weather = WeatherService::new(forecast_source_from_config(config)?);
        let snapshot = weather.snapshot(Some(state.selected_city.as_str())).await;
        info!(city = %state.selected_city, "fetched snapshot");
        state.update_weather(snapshot);
    }

    let Some(snapshot) = state.display() else {
        anyhow::bail!("No weather to display for {}", state.selected_city);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!("{}", render::dialog(snapshot, render::taipei_now(), state.is_overridden()));
    }

    Ok(())
}
