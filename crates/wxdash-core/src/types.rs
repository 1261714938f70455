//! Core data types for forecast samples and daily summaries

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ForecastError;

/// Timestamp type (Unix epoch seconds)
pub type Timestamp = i64;

/// Source identifier echoed in every report
pub const SOURCE_OPENWEATHERMAP: &str = "openweathermap";

/// One complete forecast data point (metric units)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSample {
    /// Unix timestamp of the forecast slot
    pub timestamp: Timestamp,

    /// Temperature in °C
    pub temperature: f64,

    /// Relative humidity (%)
    pub humidity: u8,

    /// Wind speed in m/s
    pub wind_speed: f64,

    /// Free-text condition description, e.g. "light rain"
    pub condition: String,
}

/// A forecast data point as decoded from the provider, fields may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialSample {
    pub timestamp: Option<Timestamp>,
    pub temperature: Option<f64>,
    pub humidity: Option<i64>,
    pub wind_speed: Option<f64>,
    pub condition: Option<String>,
}

impl RawSample {
    /// Check the value ranges of every field.
    ///
    /// Temperature and wind must be finite, wind non-negative, humidity at
    /// most 100 and the condition non-empty.
    pub fn validate(&self, index: usize) -> Result<(), ForecastError> {
        let invalid = |field: &'static str| -> Result<(), ForecastError> {
            Err(ForecastError::PartialData { index, field })
        };

        if !self.temperature.is_finite() {
            return invalid("temperature");
        }
        if self.humidity > 100 {
            return invalid("humidity");
        }
        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return invalid("wind_speed");
        }
        if self.condition.is_empty() {
            return invalid("condition");
        }
        Ok(())
    }
}

impl PartialSample {
    /// Validate every required field and produce a [`RawSample`].
    ///
    /// `index` is the position of the sample in its feed and is only used
    /// for error reporting.
    pub fn complete(&self, index: usize) -> Result<RawSample, ForecastError> {
        let missing = |field: &'static str| ForecastError::PartialData { index, field };

        let sample = RawSample {
            timestamp: self.timestamp.ok_or_else(|| missing("timestamp"))?,
            temperature: self.temperature.ok_or_else(|| missing("temperature"))?,
            humidity: self
                .humidity
                .and_then(|h| u8::try_from(h).ok())
                .ok_or_else(|| missing("humidity"))?,
            wind_speed: self.wind_speed.ok_or_else(|| missing("wind_speed"))?,
            condition: self.condition.clone().ok_or_else(|| missing("condition"))?,
        };
        sample.validate(index)?;
        Ok(sample)
    }
}

impl From<RawSample> for PartialSample {
    fn from(sample: RawSample) -> Self {
        Self {
            timestamp: Some(sample.timestamp),
            temperature: Some(sample.temperature),
            humidity: Some(i64::from(sample.humidity)),
            wind_speed: Some(sample.wind_speed),
            condition: Some(sample.condition),
        }
    }
}

/// Reduced view of one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailySummary {
    pub date: NaiveDate,

    /// Mean temperature in °C, rounded
    #[serde(rename = "averageTemperature")]
    pub average_temperature: i64,

    /// Most frequent condition of the day
    #[serde(rename = "dominantCondition")]
    pub dominant_condition: String,

    #[serde(rename = "averageHumidity")]
    pub average_humidity: u8,

    /// Mean wind speed in m/s, rounded
    #[serde(rename = "averageWindSpeed")]
    pub average_wind_speed: i64,
}

/// Forecast payload reduced to what the aggregator needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastFeed {
    pub place: String,
    pub country: String,
    pub samples: Vec<PartialSample>,
}

/// Daily summaries plus passthrough metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastReport {
    pub place: String,
    pub country: String,

    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,

    pub source: String,

    /// IANA name of the zone used for day boundaries
    pub timezone: String,

    /// Samples dropped because a required field was missing or invalid
    #[serde(rename = "skippedSamples")]
    pub skipped_samples: usize,

    pub days: Vec<DailySummary>,
}

/// Current conditions for a city (metric units).
///
/// Only the temperatures are guaranteed; the weather route needs nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    pub place: String,
    pub country: String,
    pub temperature: f64,
    #[serde(rename = "feelsLike")]
    pub feels_like: f64,
    pub humidity: Option<u8>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
}

/// City lookup forwarded to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    pub city: String,
    pub api_key: String,
}

impl CityQuery {
    pub fn new(city: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            api_key: api_key.into(),
        }
    }
}
