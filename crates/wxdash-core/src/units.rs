//! Unit conversion utilities
//!
//! All rounding in this crate goes through [`round_half_away`]: ties round
//! away from zero, so 2.5 becomes 3 and -2.5 becomes -3.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit conversion error
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown unit system: {0}")]
    UnknownUnit(String),
}

/// Display unit for temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }

    /// Convert a Celsius reading into this unit without rounding
    pub fn convert_celsius_exact(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TemperatureUnit::Kelvin => celsius + KELVIN_OFFSET,
        }
    }

    /// Convert a Celsius reading into this unit, rounded
    pub fn convert_celsius(&self, celsius: f64) -> i64 {
        round_half_away(self.convert_celsius_exact(celsius))
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "imperial" | "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            "standard" | "kelvin" | "k" => Ok(TemperatureUnit::Kelvin),
            _ => Err(UnitError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "metric"),
            TemperatureUnit::Fahrenheit => write!(f, "imperial"),
            TemperatureUnit::Kelvin => write!(f, "standard"),
        }
    }
}

/// 0 °C in kelvin
pub const KELVIN_OFFSET: f64 = 273.15;

/// m/s to km/h
pub const MPS_TO_KMH: f64 = 3.6;

/// Round to the nearest integer, ties away from zero
pub fn round_half_away(value: f64) -> i64 {
    value.round() as i64
}

/// C to F, rounded
pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
    round_half_away(celsius * 9.0 / 5.0 + 32.0)
}

/// F to C, rounded
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i64 {
    round_half_away((fahrenheit - 32.0) * 5.0 / 9.0)
}

/// m/s to km/h, rounded
pub fn mps_to_kmh(speed: f64) -> i64 {
    round_half_away(speed * MPS_TO_KMH)
}

/// km/h to m/s, rounded
pub fn kmh_to_mps(speed: f64) -> i64 {
    round_half_away(speed / MPS_TO_KMH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_conversion() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32);
        assert_eq!(celsius_to_fahrenheit(100.0), 212);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40);
        assert_eq!(celsius_to_fahrenheit(21.0), 70);

        assert_eq!(fahrenheit_to_celsius(212.0), 100);
        assert_eq!(fahrenheit_to_celsius(-40.0), -40);
    }

    #[test]
    fn test_rounding_ties_away_from_zero() {
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(-2.5), -3);
        assert_eq!(round_half_away(2.49), 2);
        assert_eq!(round_half_away(-0.4), 0);
    }

    #[test]
    fn test_wind_conversion() {
        assert_eq!(mps_to_kmh(0.0), 0);
        assert_eq!(mps_to_kmh(10.0), 36);
        assert_eq!(mps_to_kmh(4.1), 15);
        assert_eq!(kmh_to_mps(36.0), 10);
    }

    #[test]
    fn test_round_trip_within_rounding_error() {
        for c in -30..=45 {
            let f = celsius_to_fahrenheit(f64::from(c));
            let back = fahrenheit_to_celsius(f as f64);
            assert!((back - i64::from(c)).abs() <= 1, "{c} -> {f} -> {back}");
        }
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("metric".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert_eq!("Imperial".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!("F".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert!("rankine".parse::<TemperatureUnit>().is_err());
        assert_eq!(TemperatureUnit::Fahrenheit.convert_celsius(100.0), 212);
        assert_eq!(TemperatureUnit::Celsius.symbol(), "°C");
    }

    #[test]
    fn test_kelvin_unit() {
        let unit: TemperatureUnit = "standard".parse().unwrap();
        assert_eq!(unit, TemperatureUnit::Kelvin);
        assert_eq!(unit.to_string(), "standard");
        assert_eq!(unit.symbol(), "K");
        assert_eq!(unit.convert_celsius(0.0), 273);
        assert_eq!(unit.convert_celsius(20.0), 293);
        assert!(unit.convert_celsius_exact(-273.15).abs() < 1e-9);
    }
}
