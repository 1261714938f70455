//! OpenWeatherMap integration
//!
//! Implements [`wxdash_core::WeatherProvider`] on top of the 2.5 REST API
//! (`/weather` and `/forecast`), always requesting metric units.

pub mod client;
pub mod models;

pub use client::*;
