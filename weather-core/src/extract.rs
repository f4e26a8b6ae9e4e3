//! Upstream payload shapes and field extraction.
//!
//! A CWA forecast location carries a list of weather elements. Each element
//! holds time windows, and each window holds bags of named string values:
//!
//! ```text
//! WeatherElement { ElementName: "平均溫度",
//!   Time: [ { StartTime, EndTime, ElementValue: [ { "Temperature": "20" } ] } ] }
//! ```
//!
//! Missing data is reported upstream as `"-"` or an empty string.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Top-level forecast dataset response.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub records: Option<Records>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Records {
    #[serde(rename = "Locations", default)]
    pub locations: Vec<LocationGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationGroup {
    #[serde(rename = "Location", default)]
    pub location: Vec<LocationForecast>,
}

/// Forecast for a single location.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationForecast {
    #[serde(rename = "LocationName")]
    pub location_name: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<String>,
    #[serde(rename = "WeatherElement", default)]
    pub weather_element: Vec<WeatherElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherElement {
    #[serde(rename = "ElementName")]
    pub element_name: String,
    #[serde(rename = "Time", default)]
    pub time: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeWindow {
    #[serde(rename = "StartTime", alias = "DataTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "EndTime", default)]
    pub end_time: Option<String>,
    #[serde(rename = "ElementValue", default)]
    pub element_value: Vec<HashMap<String, Value>>,
}

impl ForecastPayload {
    /// All locations in the payload, across every location group.
    pub fn locations(&self) -> impl Iterator<Item = &LocationForecast> {
        self.records
            .iter()
            .flat_map(|records| records.locations.iter())
            .flat_map(|group| group.location.iter())
    }

    pub fn find(&self, location_name: &str) -> Option<&LocationForecast> {
        self.locations().find(|loc| loc.location_name == location_name)
    }
}

impl LocationForecast {
    pub fn elements(&self) -> Elements<'_> {
        Elements(&self.weather_element)
    }
}

/// Read-only view over a location's weather elements.
#[derive(Debug, Clone, Copy)]
pub struct Elements<'a>(pub &'a [WeatherElement]);

impl<'a> Elements<'a> {
    fn first_window(&self, element: &str) -> Option<&'a TimeWindow> {
        self.0
            .iter()
            .find(|e| e.element_name == element)
            .and_then(|e| e.time.first())
    }

    fn raw(&self, element: &str, prop: &str) -> Option<&'a Value> {
        self.first_window(element)?.element_value.first()?.get(prop)
    }

    /// String value of `prop` in the first window of `element`.
    ///
    /// Sentinels (`"-"`, `""`) and non-scalar values yield `None`.
    pub fn text(&self, element: &str, prop: &str) -> Option<String> {
        let text = match self.raw(element, prop)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if is_sentinel(&text) { None } else { Some(text) }
    }

    /// Numeric value of `prop`; unparseable or non-finite values yield `None`.
    pub fn number(&self, element: &str, prop: &str) -> Option<f64> {
        self.text(element, prop)?
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }

    /// Start of the first time window of `element`.
    pub fn start_time(&self, element: &str) -> Option<String> {
        self.first_window(element)?
            .start_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !is_sentinel(s))
            .map(str::to_string)
    }
}

fn is_sentinel(value: &str) -> bool {
    value.is_empty() || value == "-"
}
