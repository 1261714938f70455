use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wxdash_core::{ForecastError, ProviderError};

/// Failure of an API request, rendered as `{error, message}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Provider(ProviderError),
    Forecast(ForecastError),
    RouteNotFound(String),
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        ApiError::Provider(e)
    }
}

impl From<ForecastError> for ApiError {
    fn from(e: ForecastError) -> Self {
        ApiError::Forecast(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(ProviderError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Provider(ProviderError::CityNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Forecast(_) => StatusCode::BAD_GATEWAY,
            ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn body(&self) -> (&'static str, String) {
        match self {
            ApiError::BadRequest(message) => ("Bad Request", message.clone()),
            ApiError::Provider(ProviderError::Unauthorized) => {
                ("Unauthorized", "Invalid API key provided".to_string())
            }
            ApiError::Provider(ProviderError::CityNotFound(city)) => {
                ("Not Found", format!("City \"{city}\" not found"))
            }
            ApiError::Provider(_) => (
                "Internal Server Error",
                "Failed to fetch weather data".to_string(),
            ),
            ApiError::Forecast(_) => (
                "Bad Gateway",
                "Upstream forecast contained no usable samples".to_string(),
            ),
            ApiError::RouteNotFound(path) => (
                "API endpoint not found",
                format!("Route {path} does not exist"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Provider(e) => tracing::error!(error = %e, "weather API error"),
            ApiError::Forecast(e) => tracing::error!(error = %e, "forecast aggregation failed"),
            _ => {}
        }
        let (error, message) = self.body();
        (self.status(), Json(json!({ "error": error, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ProviderError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(ProviderError::CityNotFound("Nowhere".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ProviderError::Upstream { status: 500 }).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ForecastError::InvalidInput("empty".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn city_not_found_message() {
        let (error, message) = ApiError::from(ProviderError::CityNotFound("Atlantis".into())).body();
        assert_eq!(error, "Not Found");
        assert_eq!(message, "City \"Atlantis\" not found");
    }
}
