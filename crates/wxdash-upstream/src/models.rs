//! OpenWeatherMap 2.5 response payloads
//!
//! Forecast entries are decoded leniently: any missing piece becomes `None`
//! and is dealt with by the aggregator.

use serde::Deserialize;
use wxdash_core::{CurrentConditions, ForecastFeed, PartialSample};

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub main: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Country {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
}

/// `GET /weather`
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub name: String,
    pub sys: Country,
    pub main: CurrentMain,
    pub wind: Option<Wind>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

impl CurrentResponse {
    pub fn into_conditions(self) -> CurrentConditions {
        CurrentConditions {
            place: self.name,
            country: self.sys.country.unwrap_or_default(),
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_speed: self.wind.and_then(|w| w.speed),
            description: self.weather.into_iter().next().and_then(|c| c.description),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: Option<f64>,
    pub humidity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    pub dt: Option<i64>,
    pub main: Option<ForecastMain>,
    pub wind: Option<Wind>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

impl From<&ForecastEntry> for PartialSample {
    fn from(entry: &ForecastEntry) -> Self {
        PartialSample {
            timestamp: entry.dt,
            temperature: entry.main.as_ref().and_then(|m| m.temp),
            humidity: entry.main.as_ref().and_then(|m| m.humidity),
            wind_speed: entry.wind.as_ref().and_then(|w| w.speed),
            condition: entry.weather.first().and_then(|c| c.description.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct City {
    pub name: Option<String>,
    pub country: Option<String>,
}

/// `GET /forecast`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    pub city: Option<City>,
}

impl ForecastResponse {
    pub fn into_feed(self) -> ForecastFeed {
        let samples = self.list.iter().map(PartialSample::from).collect();
        let (place, country) = match self.city {
            Some(city) => (
                city.name.unwrap_or_default(),
                city.country.unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        ForecastFeed {
            place,
            country,
            samples,
        }
    }
}
