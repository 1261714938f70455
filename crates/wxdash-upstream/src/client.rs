use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;
use wxdash_core::{
    CityQuery, CurrentConditions, ForecastFeed, ProviderError, ProviderResult, WeatherProvider,
};

use crate::models::{CurrentResponse, ForecastResponse};

/// Client for the OpenWeatherMap 2.5 REST API
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(ProviderError::Transport("empty base url".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/{path}?q=..&appid=..&units=metric`
    fn endpoint(&self, path: &str, query: &CityQuery) -> ProviderResult<Url> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        Url::parse_with_params(
            &raw,
            &[
                ("q", query.city.as_str()),
                ("appid", query.api_key.as_str()),
                ("units", "metric"),
            ],
        )
        .map_err(|e| ProviderError::Transport(format!("invalid url {raw}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &CityQuery) -> ProviderResult<T> {
        let url = self.endpoint(path, query)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), path, "upstream request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ProviderError::Unauthorized,
                StatusCode::NOT_FOUND => ProviderError::CityNotFound(query.city.clone()),
                other => ProviderError::Upstream {
                    status: other.as_u16(),
                },
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;
        debug!(bytes = body.len(), path, "upstream response received");
        serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self, query), fields(city = %query.city))]
    async fn current(&self, query: &CityQuery) -> ProviderResult<CurrentConditions> {
        let response: CurrentResponse = self.get_json("weather", query).await?;
        Ok(response.into_conditions())
    }

    #[instrument(skip(self, query), fields(city = %query.city))]
    async fn forecast(&self, query: &CityQuery) -> ProviderResult<ForecastFeed> {
        let response: ForecastResponse = self.get_json("forecast", query).await?;
        let feed = response.into_feed();
        debug!(samples = feed.samples.len(), "forecast decoded");
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_city() {
        let client =
            OpenWeatherClient::new("https://api.example.com/data/2.5/", Duration::from_secs(1))
                .unwrap();
        let url = client
            .endpoint("forecast", &CityQuery::new("São Paulo", "k&y"))
            .unwrap();
        assert_eq!(url.path(), "/data/2.5/forecast");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "São Paulo".to_string()),
                ("appid".to_string(), "k&y".to_string()),
                ("units".to_string(), "metric".to_string()),
            ]
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(OpenWeatherClient::new("", Duration::from_secs(1)).is_err());
    }
}
