use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::classify::{self, ClassifyInput};

pub const DEFAULT_TEMPERATURE_C: i32 = 25;
pub const DEFAULT_HUMIDITY_PCT: u8 = 60;
pub const DEFAULT_WIND_SPEED_MPS: f64 = 2.0;
pub const DEFAULT_WIND_DIRECTION: &str = "偏北風";
pub const DEFAULT_WEATHER: &str = "多雲";
pub const DEFAULT_WEATHER_CODE: &str = classify::CLOUDY_CODE;

pub const FALLBACK_CITY: &str = "台北市";
pub const FALLBACK_REGION: &str = "台北市";
pub const FALLBACK_COUNTRY: &str = "台灣";

/// Normalized weather for one city, as served by `/api/weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub city: String,
    pub location_name: String,
    pub temperature: i32,
    pub min_temp: i32,
    pub max_temp: i32,
    pub apparent_temp: i32,
    pub weather: String,
    pub weather_code: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub pop: u8,
    pub is_day: bool,
    pub is_windy: bool,
    pub is_raining: bool,
    pub observation_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WeatherSnapshot {
    /// Synthetic default returned whenever real data cannot be obtained.
    pub fn fallback(city: &str, location_name: &str, error: impl Into<String>, hour: u32) -> Self {
        let conditions = classify::classify(&ClassifyInput {
            description: DEFAULT_WEATHER,
            weather_code: DEFAULT_WEATHER_CODE,
            temperature: DEFAULT_TEMPERATURE_C,
            wind_speed: DEFAULT_WIND_SPEED_MPS,
            pop: 0,
            hour,
        });

        Self {
            city: city.to_string(),
            location_name: location_name.to_string(),
            temperature: DEFAULT_TEMPERATURE_C,
            min_temp: DEFAULT_TEMPERATURE_C,
            max_temp: DEFAULT_TEMPERATURE_C,
            apparent_temp: DEFAULT_TEMPERATURE_C,
            weather: DEFAULT_WEATHER.to_string(),
            weather_code: conditions.weather_code,
            humidity: DEFAULT_HUMIDITY_PCT,
            wind_speed: DEFAULT_WIND_SPEED_MPS,
            wind_direction: DEFAULT_WIND_DIRECTION.to_string(),
            pop: 0,
            is_day: conditions.is_day,
            is_windy: conditions.is_windy,
            is_raining: conditions.is_raining,
            observation_time: Utc::now().to_rfc3339(),
            error: Some(error.into()),
        }
    }
}

/// Best guess of a visitor's location, as served by `/api/location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGuess {
    pub city: String,
    pub region: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocationGuess {
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            city: FALLBACK_CITY.to_string(),
            region: FALLBACK_REGION.to_string(),
            country: FALLBACK_COUNTRY.to_string(),
            lat: None,
            lon: None,
            error: Some(error.into()),
        }
    }
}
