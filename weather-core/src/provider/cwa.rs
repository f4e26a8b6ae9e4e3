use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url, header::AUTHORIZATION};
use tracing::debug;

use crate::{
    cache::ResponseCache,
    config::CwaConfig,
    error::{WeatherError, truncate_body},
    extract::{ForecastPayload, LocationForecast},
};

use super::ForecastSource;

/// Central Weather Administration open-data forecast client.
///
/// Fetches the whole dataset (every county) and picks out one location, so
/// a single cached response serves all cities.
#[derive(Debug)]
pub struct CwaSource {
    api_key: Option<String>,
    endpoint: Url,
    http: Client,
    cache: ResponseCache<Arc<ForecastPayload>>,
}

impl CwaSource {
    pub fn new(api_key: Option<String>, config: &CwaConfig) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.dataset
        ))
        .with_context(|| format!("Invalid CWA base URL: {}", config.base_url))?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client for CWA")?;

        Ok(Self { api_key, endpoint, http, cache: ResponseCache::new(config.cache_ttl()) })
    }

    /// The API key goes in the `Authorization` header, never in the URL.
    fn dataset_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("format", "JSON");
        url
    }

    async fn fetch_dataset(&self, api_key: &str) -> Result<Arc<ForecastPayload>, WeatherError> {
        let url = self.dataset_url();
        if let Some(cached) = self.cache.get(url.as_str()) {
            debug!(dataset = %self.endpoint, "serving forecast from cache");
            return Ok(cached);
        }

        let res = self.http.get(url.clone()).header(AUTHORIZATION, api_key).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status { status, body: truncate_body(&body) });
        }

        let payload: ForecastPayload = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Payload(format!("invalid forecast JSON: {e}")))?;

        if payload.records.is_none() {
            return Err(WeatherError::Payload(format!(
                "forecast JSON has no records: {}",
                truncate_body(&body)
            )));
        }

        let payload = Arc::new(payload);
        self.cache.insert(url.as_str(), Arc::clone(&payload));
        debug!(dataset = %self.endpoint, locations = payload.locations().count(), "fetched forecast");
        Ok(payload)
    }
}

#[async_trait]
impl ForecastSource for CwaSource {
    async fn fetch_location(&self, location_name: &str) -> Result<LocationForecast, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let payload = self.fetch_dataset(api_key).await?;

        payload
            .find(location_name)
            .cloned()
            .ok_or_else(|| WeatherError::LocationNotFound(location_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, WeatherService};
    use axum::{Router, extract::State, http::{HeaderMap, StatusCode}, routing::get};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: &str = "SUPERSECRET";

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    /// Upstream answering every dataset request with `status` and `body`,
    /// counting hits that carried the expected key header.
    async fn upstream(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/F-D0047-091",
                get(move |State(hits): State<Arc<AtomicUsize>>, headers: HeaderMap| async move {
                    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(KEY) {
                        return (StatusCode::UNAUTHORIZED, "missing key");
                    }
                    hits.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }),
            )
            .with_state(Arc::clone(&hits));
        (spawn_upstream(router).await, hits)
    }

    fn source_at(base_url: &str) -> CwaSource {
        let mut cfg = Config::default();
        cfg.cwa.base_url = base_url.to_string();
        CwaSource::new(Some(KEY.into()), &cfg.cwa).unwrap()
    }

    const DATASET: &str = r#"{"records":{"Locations":[{"Location":[
        {"LocationName":"臺中市","WeatherElement":[
            {"ElementName":"平均溫度","Time":[{"StartTime":"2025-03-02T12:00:00+08:00","ElementValue":[{"Temperature":"18"}]}]}
        ]}
    ]}]}}"#;

    #[test]
    fn dataset_url_requests_json_without_key() {
        let cfg = Config::default();
        let source = CwaSource::new(Some(KEY.into()), &cfg.cwa).unwrap();
        let url = source.dataset_url();

        assert_eq!(
            url.as_str(),
            "https://opendata.cwa.gov.tw/api/v1/rest/datastore/F-D0047-091?format=JSON"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let mut cfg = Config::default();
        cfg.cwa.base_url = "http://localhost:8080/api/".into();
        let source = CwaSource::new(None, &cfg.cwa).unwrap();

        assert!(source.dataset_url().as_str().starts_with("http://localhost:8080/api/F-D0047-091?"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut cfg = Config::default();
        cfg.cwa.base_url = "not a url".into();
        assert!(CwaSource::new(None, &cfg.cwa).is_err());
    }

    #[tokio::test]
    async fn cached_dataset_is_served_without_network() {
        let source = source_at("http://127.0.0.1:9");

        let payload: ForecastPayload = serde_json::from_value(serde_json::json!({
            "records": { "Locations": [ { "Location": [
                { "LocationName": "臺中市", "WeatherElement": [] }
            ] } ] }
        }))
        .unwrap();
        let url = source.dataset_url();
        source.cache.insert(url.as_str(), Arc::new(payload));

        let loc = source.fetch_location("臺中市").await.unwrap();
        assert_eq!(loc.location_name, "臺中市");

        let err = source.fetch_location("澎湖縣").await.unwrap_err();
        assert!(matches!(err, WeatherError::LocationNotFound(name) if name == "澎湖縣"));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_api_key() {
        let source = source_at("http://127.0.0.1:9");

        let err = source.fetch_location("臺北市").await.unwrap_err();
        assert!(matches!(err, WeatherError::Transport(_)));
        assert!(!err.to_string().contains(KEY), "leaked key: {err}");
        assert!(!format!("{err:?}").contains(KEY));
    }

    #[tokio::test]
    async fn successful_fetch_is_cached() {
        let (base, hits) = upstream(StatusCode::OK, DATASET).await;
        let source = source_at(&base);

        let loc = source.fetch_location("臺中市").await.unwrap();
        assert_eq!(loc.location_name, "臺中市");
        assert_eq!(source.cache.len(), 1);

        source.fetch_location("臺中市").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_error_is_a_status_error_and_not_cached() {
        let (base, hits) = upstream(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;
        let source = source_at(&base);

        let err = source.fetch_location("臺中市").await.unwrap_err();
        assert!(matches!(
            &err,
            WeatherError::Status { status, body }
                if *status == StatusCode::INTERNAL_SERVER_ERROR && body == "upstream exploded"
        ));
        assert!(source.cache.is_empty());

        source.fetch_location("臺中市").await.unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn garbage_json_is_a_payload_error() {
        let (base, _) = upstream(StatusCode::OK, "<html>not json</html>").await;
        let source = source_at(&base);

        let err = source.fetch_location("臺中市").await.unwrap_err();
        assert!(matches!(err, WeatherError::Payload(_)));
        assert!(source.cache.is_empty());
    }

    #[tokio::test]
    async fn body_without_records_is_a_payload_error() {
        let (base, _) = upstream(StatusCode::OK, "{}").await;
        let source = source_at(&base);

        let err = source.fetch_location("臺中市").await.unwrap_err();
        assert!(matches!(&err, WeatherError::Payload(msg) if msg.contains("no records")));
        assert!(source.cache.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_yields_synthetic_snapshot() {
        let (base, _) = upstream(StatusCode::INTERNAL_SERVER_ERROR, "down").await;
        let service = WeatherService::new(Box::new(source_at(&base)));

        let snap = service.snapshot_at_hour(Some("台中"), 12).await;
        assert_eq!(snap.city, "台中");
        assert_eq!(snap.location_name, "臺中市");
        assert_eq!(snap.temperature, 25);
        assert_eq!(snap.humidity, 60);
        assert_eq!(snap.weather, "多雲");
        assert_eq!(snap.error.as_deref(), Some("無法獲取天氣資料"));
    }
}
