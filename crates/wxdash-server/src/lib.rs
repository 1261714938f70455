use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use tower_http::cors::{Any, CorsLayer};
use wxdash_config::AppConfig;
use wxdash_core::{TemperatureUnit, WeatherProvider};

pub mod api;
pub mod error;

pub use error::ApiError;

/// Request-independent settings resolved from configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub timezone: chrono_tz::Tz,
    pub default_unit: TemperatureUnit,
    pub cors_origins: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            default_unit: TemperatureUnit::Celsius,
            cors_origins: None,
        }
    }
}

impl Settings {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let timezone = cfg.forecast_timezone()?;
        let default_unit = cfg
            .default_units()
            .parse()
            .context("invalid forecast.units")?;
        Ok(Self {
            timezone,
            default_unit,
            cors_origins: cfg.cors_origins(),
        })
    }
}

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    upstream_errors_total: Counter<u64>,
    weather: Arc<dyn WeatherProvider>,
    settings: Settings,
}

impl AppState {
    pub fn weather(&self) -> &dyn WeatherProvider {
        self.weather.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn record_request(&self, route: &'static str) {
        self.requests_total
            .add(1, &[KeyValue::new("route", route)]);
    }

    pub(crate) fn record_upstream_error(&self, kind: &'static str) {
        self.upstream_errors_total
            .add(1, &[KeyValue::new("kind", kind)]);
    }
}

pub fn build_app(
    weather: Arc<dyn WeatherProvider>,
    settings: Settings,
) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("wxdash-server");

    let requests_total = meter
        .u64_counter("wxdash_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let upstream_errors_total = meter
        .u64_counter("wxdash_upstream_errors_total")
        .with_description("Failed calls to the weather provider")
        .init();

    let cors = cors_layer(settings.cors_origins.as_deref());

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        upstream_errors_total,
        weather,
        settings,
    });

    let router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/weather/:city", get(api::current_weather))
        .route("/api/forecast/:city", get(api::forecast))
        .route("/api/dashboard/:city", get(api::dashboard))
        .fallback(api::not_found)
        .layer(cors)
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match origins {
        None => layer.allow_origin(Any),
        Some(list) => {
            let parsed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(parsed)
        }
    }
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.record_request("health");
    Json(serde_json::json!({
        "status": "OK",
        "message": "Weather Dashboard API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.record_request("healthz");
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> ([(header::HeaderName, HeaderValue); 1], String) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}
