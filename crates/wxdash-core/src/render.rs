//! Display shaping for the dashboard
//!
//! Rendering is a pure function of the fetched data and the caller's
//! [`DisplayOptions`].

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::units::{mps_to_kmh, TemperatureUnit};
use crate::{CurrentConditions, ForecastReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub unit: TemperatureUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentView {
    pub temperature: i64,
    pub unit: String,
    pub condition: Option<String>,
    pub humidity: Option<u8>,
    /// km/h
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDayView {
    pub label: String,
    pub condition: String,
    pub temperature: i64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardView {
    pub location: String,
    pub current: CurrentView,
    pub forecast: Vec<ForecastDayView>,
}

/// Upper-case the first character of every space-separated word
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn day_label(position: usize, date: chrono::NaiveDate) -> String {
    match position {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => weekday_name(date.weekday()).to_string(),
    }
}

fn weekday_name(day: chrono::Weekday) -> &'static str {
    match day {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

/// Build the dashboard view.
///
/// Daily temperatures are already rounded Celsius means, the Fahrenheit
/// conversion is applied to that rounded value.
pub fn render_dashboard(
    current: &CurrentConditions,
    report: &ForecastReport,
    options: &DisplayOptions,
) -> DashboardView {
    let unit = options.unit;

    let forecast = report
        .days
        .iter()
        .enumerate()
        .map(|(position, day)| ForecastDayView {
            label: day_label(position, day.date),
            condition: capitalize_words(&day.dominant_condition),
            temperature: unit.convert_celsius(day.average_temperature as f64),
            unit: unit.symbol().to_string(),
        })
        .collect();

    DashboardView {
        location: format!("{}, {}", current.place, current.country),
        current: CurrentView {
            temperature: unit.convert_celsius(current.temperature),
            unit: unit.symbol().to_string(),
            condition: current.description.as_deref().map(capitalize_words),
            humidity: current.humidity,
            wind_speed: current.wind_speed.map(mps_to_kmh),
        },
        forecast,
    }
}

/// Temperature and feels-like in the requested unit
pub fn temperature_pair(current: &CurrentConditions, unit: TemperatureUnit) -> (f64, f64) {
    (
        unit.convert_celsius_exact(current.temperature),
        unit.convert_celsius_exact(current.feels_like),
    )
}
