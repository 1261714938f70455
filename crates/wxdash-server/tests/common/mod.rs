#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use tower::ServiceExt;
use wxdash_core::{
    CityQuery, CurrentConditions, ForecastFeed, PartialSample, ProviderError, ProviderResult,
    RawSample, WeatherProvider,
};
use wxdash_server::{AppState, Settings};

// 2024-01-15T00:00:00Z, a Monday
pub const DAY0: i64 = 1_705_276_800;
pub const HOUR: i64 = 3_600;

/// What the stub provider answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Ok,
    Unauthorized,
    NotFound,
    Unavailable,
    EmptyForecast,
}

pub struct StubProvider {
    behavior: Behavior,
    pub current_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
        }
    }

    fn failure(&self, query: &CityQuery) -> Option<ProviderError> {
        match self.behavior {
            Behavior::Unauthorized => Some(ProviderError::Unauthorized),
            Behavior::NotFound => Some(ProviderError::CityNotFound(query.city.clone())),
            Behavior::Unavailable => Some(ProviderError::Upstream { status: 503 }),
            Behavior::Ok | Behavior::EmptyForecast => None,
        }
    }
}

/// Six days of three-hourly samples; day `d` averages `10 + d` °C
pub fn samples() -> Vec<PartialSample> {
    (0..48)
        .map(|slot| {
            let day = slot / 8;
            let condition = if slot % 8 < 5 { "light rain" } else { "scattered clouds" };
            PartialSample::from(RawSample {
                timestamp: DAY0 + slot * 3 * HOUR,
                temperature: 10.0 + day as f64,
                humidity: 70,
                wind_speed: 2.0,
                condition: condition.to_string(),
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl WeatherProvider for StubProvider {
    async fn current(&self, query: &CityQuery) -> ProviderResult<CurrentConditions> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure(query) {
            return Err(err);
        }
        Ok(CurrentConditions {
            place: query.city.clone(),
            country: "GB".into(),
            temperature: 21.4,
            feels_like: 20.0,
            humidity: Some(64),
            wind_speed: Some(4.1),
            description: Some("broken clouds".into()),
        })
    }

    async fn forecast(&self, query: &CityQuery) -> ProviderResult<ForecastFeed> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure(query) {
            return Err(err);
        }
        let samples = match self.behavior {
            Behavior::EmptyForecast => Vec::new(),
            _ => samples(),
        };
        Ok(ForecastFeed {
            place: query.city.clone(),
            country: "GB".into(),
            samples,
        })
    }
}

pub fn app(behavior: Behavior) -> (Router, Arc<AppState>, Arc<StubProvider>) {
    let stub = Arc::new(StubProvider::new(behavior));
    let (router, state) =
        wxdash_server::build_app(stub.clone(), Settings::default()).expect("app builds");
    (router, state, stub)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(res: Response<Body>) -> String {
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
