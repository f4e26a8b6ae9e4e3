use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    config::GeoConfig,
    error::{WeatherError, truncate_body},
    model::{FALLBACK_CITY, FALLBACK_COUNTRY, FALLBACK_REGION, LocationGuess},
};

use super::GeoLocator;

/// ip-api.com geolocation client.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    base_url: Url,
    lang: String,
    http: Client,
}

impl IpApiLocator {
    pub fn new(config: &GeoConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid geolocation base URL: {}", config.base_url))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client for geolocation")?;

        Ok(Self { base_url, lang: config.lang.clone(), http })
    }

    fn lookup_url(&self, ip: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ip);
        }
        url.query_pairs_mut().append_pair("lang", &self.lang);
        url
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_guess(self) -> Result<LocationGuess, WeatherError> {
        if self.status == "fail" {
            return Err(WeatherError::GeoLookup(
                self.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        Ok(LocationGuess {
            city: non_empty_or(self.city, FALLBACK_CITY),
            region: non_empty_or(self.region_name, FALLBACK_REGION),
            country: non_empty_or(self.country, FALLBACK_COUNTRY),
            lat: self.lat,
            lon: self.lon,
            error: None,
        })
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    async fn locate(&self, ip: &str) -> Result<LocationGuess, WeatherError> {
        let res = self.http.get(self.lookup_url(ip)).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status { status, body: truncate_body(&body) });
        }

        let parsed: IpApiResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Payload(format!("invalid geolocation JSON: {e}")))?;

        parsed.into_guess()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationService;
    use axum::{Router, extract::{Path, Query}, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_upstream(router: Router) -> GeoConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        GeoConfig { base_url: format!("http://{addr}/json"), ..GeoConfig::default() }
    }

    fn parse(value: serde_json::Value) -> IpApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn lookup_url_appends_ip_and_language() {
        let locator = IpApiLocator::new(&GeoConfig::default()).unwrap();
        assert_eq!(
            locator.lookup_url("8.8.8.8").as_str(),
            "http://ip-api.com/json/8.8.8.8?lang=zh-TW"
        );
    }

    #[test]
    fn success_maps_fields() {
        let guess = parse(json!({
            "status": "success",
            "country": "臺灣",
            "regionName": "臺北市",
            "city": "臺北市",
            "lat": 25.05,
            "lon": 121.53
        }))
        .into_guess()
        .unwrap();

        assert_eq!(guess.city, "臺北市");
        assert_eq!(guess.region, "臺北市");
        assert_eq!(guess.lat, Some(25.05));
        assert!(guess.error.is_none());
    }

    #[test]
    fn empty_fields_fall_back_to_defaults() {
        let guess = parse(json!({ "status": "success", "city": "", "country": "Japan" }))
            .into_guess()
            .unwrap();

        assert_eq!(guess.city, FALLBACK_CITY);
        assert_eq!(guess.region, FALLBACK_REGION);
        assert_eq!(guess.country, "Japan");
    }

    #[test]
    fn fail_status_is_an_error() {
        let err = parse(json!({ "status": "fail", "message": "private range" }))
            .into_guess()
            .unwrap_err();

        assert!(matches!(err, WeatherError::GeoLookup(msg) if msg == "private range"));
    }

    #[tokio::test]
    async fn live_lookup_sends_ip_and_language() {
        let router = Router::new().route(
            "/json/:ip",
            get(|Path(ip): Path<String>, Query(q): Query<HashMap<String, String>>| async move {
                axum::Json(json!({
                    "status": "success",
                    "city": ip,
                    "regionName": q.get("lang").cloned().unwrap_or_default(),
                    "country": "臺灣",
                    "lat": 25.0,
                    "lon": 121.5
                }))
            }),
        );
        let locator = IpApiLocator::new(&spawn_upstream(router).await).unwrap();

        let guess = locator.locate("8.8.8.8").await.unwrap();
        assert_eq!(guess.city, "8.8.8.8");
        assert_eq!(guess.region, "zh-TW");
        assert_eq!(guess.lon, Some(121.5));
    }

    #[tokio::test]
    async fn non_success_status_falls_back_with_error() {
        let router = Router::new().route(
            "/json/:ip",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let locator = IpApiLocator::new(&spawn_upstream(router).await).unwrap();

        let err = locator.locate("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, WeatherError::Status { status, .. } if status == StatusCode::TOO_MANY_REQUESTS));

        let guess = LocationService::new(Box::new(locator)).locate("8.8.8.8").await;
        assert_eq!(guess.city, FALLBACK_CITY);
        assert_eq!(guess.country, FALLBACK_COUNTRY);
        assert_eq!(guess.error.as_deref(), Some("無法獲取位置"));
    }

    #[tokio::test]
    async fn garbage_body_is_a_payload_error() {
        let router = Router::new().route("/json/:ip", get(|| async { "not json" }));
        let locator = IpApiLocator::new(&spawn_upstream(router).await).unwrap();

        let err = locator.locate("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, WeatherError::Payload(_)));
    }
}
