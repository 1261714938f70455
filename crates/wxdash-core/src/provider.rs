use crate::{CityQuery, CurrentConditions, ForecastFeed};

/// Errors surfaced by a weather provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid API key")]
    Unauthorized,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid upstream payload: {0}")]
    Decode(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Source of current conditions and multi-day forecasts for a city
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, query: &CityQuery) -> ProviderResult<CurrentConditions>;

    async fn forecast(&self, query: &CityQuery) -> ProviderResult<ForecastFeed>;
}
