//! Weather API handlers

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use wxdash_core::{
    build_report, render_dashboard, temperature_pair, CityQuery, DashboardView, DisplayOptions,
    ForecastReport, ProviderError, TemperatureUnit,
};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    apikey: Option<String>,
    units: Option<String>,
    tz: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemperatureBody {
    pub temperature: f64,
    pub feels_like: f64,
}

fn city_query(city: &str, params: &WeatherParams) -> Result<CityQuery, ApiError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(ApiError::BadRequest("City parameter is required".into()));
    }
    let api_key = params
        .apikey
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest(
                "API key is required. Add ?apikey=YOUR_API_KEY to the request".into(),
            )
        })?;
    Ok(CityQuery::new(city, api_key))
}

fn display_unit(params: &WeatherParams, state: &AppState) -> Result<TemperatureUnit, ApiError> {
    match params.units.as_deref() {
        None => Ok(state.settings().default_unit),
        Some(units) => units
            .parse()
            .map_err(|e: wxdash_core::UnitError| ApiError::BadRequest(e.to_string())),
    }
}

fn timezone(params: &WeatherParams, state: &AppState) -> Result<chrono_tz::Tz, ApiError> {
    match params.tz.as_deref() {
        None => Ok(state.settings().timezone),
        Some(name) => name
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Unknown time zone: {name}"))),
    }
}

fn upstream_failure(state: &AppState, err: ProviderError) -> ApiError {
    let kind = match &err {
        ProviderError::Unauthorized => "unauthorized",
        ProviderError::CityNotFound(_) => "not_found",
        ProviderError::Upstream { .. } => "status",
        ProviderError::Transport(_) => "transport",
        ProviderError::Decode(_) => "decode",
    };
    state.record_upstream_error(kind);
    ApiError::Provider(err)
}

/// `GET /api/weather/:city` - temperature and feels-like only
pub async fn current_weather(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<TemperatureBody>, ApiError> {
    state.record_request("weather");
    let query = city_query(&city, &params)?;
    let unit = display_unit(&params, &state)?;

    let current = state
        .weather()
        .current(&query)
        .await
        .map_err(|e| upstream_failure(&state, e))?;

    let (temperature, feels_like) = temperature_pair(&current, unit);
    Ok(Json(TemperatureBody {
        temperature,
        feels_like,
    }))
}

/// `GET /api/forecast/:city` - daily summaries for up to five days
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<ForecastReport>, ApiError> {
    state.record_request("forecast");
    let query = city_query(&city, &params)?;
    let tz = timezone(&params, &state)?;

    let feed = state
        .weather()
        .forecast(&query)
        .await
        .map_err(|e| upstream_failure(&state, e))?;

    let report = build_report(&feed, &tz, chrono::Utc::now())?;
    info!(
        city = %query.city,
        days = report.days.len(),
        skipped = report.skipped_samples,
        "forecast aggregated"
    );
    Ok(Json(report))
}

/// `GET /api/dashboard/:city` - current conditions and forecast, fetched together
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<DashboardView>, ApiError> {
    state.record_request("dashboard");
    let query = city_query(&city, &params)?;
    let unit = display_unit(&params, &state)?;
    let tz = timezone(&params, &state)?;

    let weather = state.weather();
    let (current, feed) = tokio::try_join!(weather.current(&query), weather.forecast(&query))
        .map_err(|e| upstream_failure(&state, e))?;

    let report = build_report(&feed, &tz, chrono::Utc::now())?;
    let view = render_dashboard(&current, &report, &DisplayOptions { unit });
    Ok(Json(view))
}

/// Fallback for unknown routes; only `/api` paths get a JSON body
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        ApiError::RouteNotFound(path.to_string()).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
