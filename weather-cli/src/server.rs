//! HTTP front door: `/api/location` and `/api/weather`.
//!
//! Both endpoints answer 200 with a complete JSON body even when upstream
//! calls fail; failures surface only through the body's `error` field.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, Method},
    routing::get,
};
use pixel_weather_core::{LocationGuess, LocationService, WeatherService, WeatherSnapshot};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ServerState {
    weather: Arc<WeatherService>,
    location: Arc<LocationService>,
}

impl ServerState {
    pub fn new(weather: WeatherService, location: LocationService) -> Self {
        Self { weather: Arc::new(weather), location: Arc::new(location) }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    city: Option<String>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/location", get(location))
        .route("/api/weather", get(weather))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

async fn health_check() -> &'static str {
    "Pixel weather server is running! Use GET /api/weather?city=<name> or GET /api/location."
}

async fn location(State(state): State<ServerState>, headers: HeaderMap) -> Json<LocationGuess> {
    Json(state.location.locate_request(&headers).await)
}

// A malformed query string is treated as no query rather than rejected.
async fn weather(
    State(state): State<ServerState>,
    query: Option<Query<WeatherQuery>>,
) -> Json<WeatherSnapshot> {
    let city = query.and_then(|Query(q)| q.city);
    Json(state.weather.snapshot(city.as_deref()).await)
}

pub async fn serve(bind: &str, state: ServerState) -> anyhow::Result<()> {
    use anyhow::Context;

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;

    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, "pixel weather server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
