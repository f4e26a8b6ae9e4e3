//! Fixed debug scenarios that override live weather for demos.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;

use crate::classify::{CLEAR_CODE, CLOUDY_CODE, RAIN_CODE, SNOW_CODE};
use crate::model::WeatherSnapshot;

const SCENARIO_CITY: &str = "測試場景";
const SCENARIO_LOCATION: &str = "Debug Zone";
const SCENARIO_HUMIDITY: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Reset,
    Sunny,
    Rain,
    HeavyRain,
    Snow,
    Windy,
    Night,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Reset => "reset",
            Scenario::Sunny => "sunny",
            Scenario::Rain => "rain",
            Scenario::HeavyRain => "heavy-rain",
            Scenario::Snow => "snow",
            Scenario::Windy => "windy",
            Scenario::Night => "night",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Reset => "重置",
            Scenario::Sunny => "大太陽",
            Scenario::Rain => "下雨",
            Scenario::HeavyRain => "豪大雨",
            Scenario::Snow => "下雪",
            Scenario::Windy => "強風",
            Scenario::Night => "夜晚",
        }
    }

    pub const fn all() -> &'static [Scenario] {
        &[
            Scenario::Reset,
            Scenario::Sunny,
            Scenario::Rain,
            Scenario::HeavyRain,
            Scenario::Snow,
            Scenario::Windy,
            Scenario::Night,
        ]
    }

    /// Override snapshot for this scenario; `Reset` clears the override.
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        let (temperature, weather, code, wind_speed, is_day) = match self {
            Scenario::Reset => return None,
            Scenario::Sunny => (35, "晴朗炎熱", CLEAR_CODE, 2.0, true),
            Scenario::Rain => (20, "下雨", RAIN_CODE, 4.0, true),
            Scenario::HeavyRain => (18, "豪大雨", RAIN_CODE, 12.0, false),
            Scenario::Snow => (-2, "下雪", SNOW_CODE, 3.0, true),
            Scenario::Windy => (22, "強風", CLOUDY_CODE, 15.0, true),
            Scenario::Night => (18, "晴朗夜晚", CLEAR_CODE, 2.0, false),
        };
        let is_raining = code == RAIN_CODE;

        Some(WeatherSnapshot {
            city: SCENARIO_CITY.to_string(),
            location_name: SCENARIO_LOCATION.to_string(),
            temperature,
            min_temp: temperature,
            max_temp: temperature,
            apparent_temp: temperature,
            weather: weather.to_string(),
            weather_code: code.to_string(),
            humidity: SCENARIO_HUMIDITY,
            wind_speed,
            wind_direction: "偏北風".to_string(),
            pop: if is_raining { 90 } else { 0 },
            is_day,
            is_windy: crate::classify::is_windy(wind_speed),
            is_raining,
            observation_time: Utc::now().to_rfc3339(),
            error: None,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_lowercase();
        Scenario::all()
            .iter()
            .copied()
            .find(|s| s.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown scenario '{value}'. Supported scenarios: reset, sunny, rain, heavy-rain, snow, windy, night."
                )
            })
    }
}
