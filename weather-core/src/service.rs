//! Request-level orchestration.
//!
//! Both services are total: every upstream failure is logged and replaced
//! by a synthetic default carrying an `error` message, so callers always
//! get something renderable.

use chrono::{Local, Timelike, Utc};
use reqwest::header::HeaderMap;
use tracing::{info, warn};

use crate::{
    city,
    classify::{self, ClassifyInput},
    error::WeatherError,
    extract::LocationForecast,
    model::{
        DEFAULT_HUMIDITY_PCT, DEFAULT_TEMPERATURE_C, DEFAULT_WEATHER, DEFAULT_WEATHER_CODE,
        DEFAULT_WIND_DIRECTION, DEFAULT_WIND_SPEED_MPS, LocationGuess, WeatherSnapshot,
    },
    provider::{ForecastSource, GeoLocator},
};

/// Used when no forwarding header identifies the client.
pub const FALLBACK_IP: &str = "1.1.1.1";

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

mod element {
    pub const TEMPERATURE: (&str, &str) = ("平均溫度", "Temperature");
    pub const MAX_TEMPERATURE: (&str, &str) = ("最高溫度", "MaxTemperature");
    pub const MIN_TEMPERATURE: (&str, &str) = ("最低溫度", "MinTemperature");
    pub const APPARENT_TEMPERATURE: (&str, &str) = ("最高體感溫度", "MaxApparentTemperature");
    pub const HUMIDITY: (&str, &str) = ("平均相對濕度", "RelativeHumidity");
    pub const WIND_SPEED: (&str, &str) = ("風速", "WindSpeed");
    pub const WIND_DIRECTION: (&str, &str) = ("風向", "WindDirection");
    pub const POP: (&str, &str) = ("12小時降雨機率", "ProbabilityOfPrecipitation");
    pub const WEATHER: (&str, &str) = ("天氣現象", "Weather");
    pub const WEATHER_CODE: (&str, &str) = ("天氣現象", "WeatherCode");
}

#[derive(Debug)]
pub struct WeatherService {
    source: Box<dyn ForecastSource>,
}

impl WeatherService {
    pub fn new(source: Box<dyn ForecastSource>) -> Self {
        Self { source }
    }

    /// Snapshot for `city` (any accepted spelling; `None` or blank means the capital).
    pub async fn snapshot(&self, city: Option<&str>) -> WeatherSnapshot {
        self.snapshot_at_hour(city, Local::now().hour()).await
    }

    pub async fn snapshot_at_hour(&self, city: Option<&str>, hour: u32) -> WeatherSnapshot {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(city::DEFAULT_LOCATION);
        let location_name = city::canonical_name(city);

        match self.source.fetch_location(location_name).await {
            Ok(forecast) => {
                info!(city, location = location_name, "weather fetched");
                build_snapshot(city, &forecast, hour)
            }
            Err(err) => {
                warn!(city, location = location_name, error = %err, "weather fetch failed, serving defaults");
                WeatherSnapshot::fallback(city, location_name, err.user_message(), hour)
            }
        }
    }
}

/// Normalize one upstream location into a snapshot.
pub fn build_snapshot(city: &str, forecast: &LocationForecast, hour: u32) -> WeatherSnapshot {
    let elements = forecast.elements();
    let number = |(name, prop): (&str, &str)| elements.number(name, prop);
    let text = |(name, prop): (&str, &str)| elements.text(name, prop);

    let temperature = number(element::TEMPERATURE)
        .map(round_whole)
        .unwrap_or(DEFAULT_TEMPERATURE_C);
    let max_temp = number(element::MAX_TEMPERATURE).map(round_whole).unwrap_or(temperature);
    let min_temp = number(element::MIN_TEMPERATURE).map(round_whole).unwrap_or(temperature);
    let apparent_temp = number(element::APPARENT_TEMPERATURE)
        .map(round_whole)
        .unwrap_or(temperature);
    let humidity = number(element::HUMIDITY).map(percent).unwrap_or(DEFAULT_HUMIDITY_PCT);
    let wind_speed = number(element::WIND_SPEED)
        .map(round_tenth)
        .unwrap_or(DEFAULT_WIND_SPEED_MPS);
    let wind_direction =
        text(element::WIND_DIRECTION).unwrap_or_else(|| DEFAULT_WIND_DIRECTION.to_string());
    let pop = number(element::POP).map(percent).unwrap_or(0);
    let weather = text(element::WEATHER).unwrap_or_else(|| DEFAULT_WEATHER.to_string());
    let upstream_code =
        text(element::WEATHER_CODE).unwrap_or_else(|| DEFAULT_WEATHER_CODE.to_string());
    let observation_time = elements
        .start_time(element::WEATHER.0)
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let conditions = classify::classify(&ClassifyInput {
        description: &weather,
        weather_code: &upstream_code,
        temperature,
        wind_speed,
        pop,
        hour,
    });

    WeatherSnapshot {
        city: city.to_string(),
        location_name: forecast.location_name.clone(),
        temperature,
        min_temp,
        max_temp,
        apparent_temp,
        weather,
        weather_code: conditions.weather_code,
        humidity,
        wind_speed,
        wind_direction,
        pop,
        is_day: conditions.is_day,
        is_windy: conditions.is_windy,
        is_raining: conditions.is_raining,
        observation_time,
        error: None,
    }
}

fn round_whole(value: f64) -> i32 {
    value.round() as i32
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Client IP as reported by the reverse proxy.
///
/// First entry of `x-forwarded-for`, else `x-real-ip`, else [`FALLBACK_IP`].
pub fn client_ip(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    header(FORWARDED_FOR)
        .and_then(|list| list.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header(REAL_IP).map(|ip| ip.trim().to_string()).filter(|ip| !ip.is_empty()))
        .unwrap_or_else(|| FALLBACK_IP.to_string())
}

#[derive(Debug)]
pub struct LocationService {
    locator: Box<dyn GeoLocator>,
}

impl LocationService {
    pub fn new(locator: Box<dyn GeoLocator>) -> Self {
        Self { locator }
    }

    pub async fn locate_request(&self, headers: &HeaderMap) -> LocationGuess {
        self.locate(&client_ip(headers)).await
    }

    pub async fn locate(&self, ip: &str) -> LocationGuess {
        match self.locator.locate(ip).await {
            Ok(guess) => {
                info!(ip, city = %guess.city, "client located");
                guess
            }
            Err(err) => {
                warn!(ip, error = %err, "IP geolocation failed, serving defaults");
                let message = match err {
                    WeatherError::GeoLookup(_) => err.user_message(),
                    _ => "無法獲取位置".to_string(),
                };
                LocationGuess::fallback(message)
            }
        }
    }
}
