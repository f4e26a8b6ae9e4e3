//! Core library for the pixel weather service.
//!
//! This crate defines:
//! - City name normalization for the CWA open-data API
//! - Upstream providers (CWA forecasts, ip-api.com geolocation) behind traits
//! - Field extraction and derived-condition classification
//! - Total services that always produce a renderable response
//!
//! It is used by the `pixel-weather` binary (HTTP server and CLI).

pub mod cache;
pub mod city;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod provider;
pub mod scenario;
pub mod service;
pub mod session;

pub use config::Config;
pub use error::WeatherError;
pub use extract::LocationForecast;
pub use model::{LocationGuess, WeatherSnapshot};
pub use provider::{ForecastSource, GeoLocator};
pub use scenario::Scenario;
pub use service::{LocationService, WeatherService};
pub use session::{AppState, Session};
