//! Core data types, daily forecast aggregation, and unit conversion
//!
//! This crate holds everything the dashboard computes: bucketing forecast
//! samples into calendar days, reducing each day to a summary, and shaping
//! the result for display. It performs no I/O.

pub mod forecast;
pub mod provider;
pub mod render;
pub mod types;
pub mod units;

pub use forecast::*;
pub use provider::*;
pub use render::*;
pub use types::*;
pub use units::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sample {index} is missing or has an invalid {field}")]
    PartialData { index: usize, field: &'static str },
}

pub type ForecastResult<T> = Result<T, ForecastError>;
