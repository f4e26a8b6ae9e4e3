use crate::{
    Config, LocationForecast, WeatherError,
    model::LocationGuess,
    provider::{cwa::CwaSource, ipapi::IpApiLocator},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod cwa;
pub mod ipapi;

/// Source of per-location forecasts.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    /// Forecast for the location whose upstream name is exactly `location_name`.
    async fn fetch_location(&self, location_name: &str) -> Result<LocationForecast, WeatherError>;
}

/// Resolves a client IP to an approximate location.
#[async_trait]
pub trait GeoLocator: Send + Sync + Debug {
    async fn locate(&self, ip: &str) -> Result<LocationGuess, WeatherError>;
}

/// Construct the CWA forecast source from config.
///
/// Succeeds without an API key; every fetch then fails with
/// [`WeatherError::MissingApiKey`].
pub fn forecast_source_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastSource>> {
    let source = CwaSource::new(config.api_key(), &config.cwa)?;
    Ok(Box::new(source))
}

pub fn locator_from_config(config: &Config) -> anyhow::Result<Box<dyn GeoLocator>> {
    Ok(Box::new(IpApiLocator::new(&config.geo)?))
}
