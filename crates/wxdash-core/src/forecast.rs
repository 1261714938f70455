//! Daily aggregation of forecast samples
//!
//! Samples are grouped by their calendar date in an explicit time zone,
//! buckets keep the order in which their date was first seen, and each
//! bucket is reduced to a [`DailySummary`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::{debug, instrument, warn};

use crate::types::{
    DailySummary, ForecastFeed, ForecastReport, PartialSample, RawSample, SOURCE_OPENWEATHERMAP,
};
use crate::units::round_half_away;
use crate::{ForecastError, ForecastResult};

/// Number of days covered by the upstream forecast
pub const FORECAST_DAYS: usize = 5;

/// Samples sharing one local calendar date, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub samples: Vec<RawSample>,
}

/// Running mean over a stream of values
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

/// Result of aggregating a feed that may contain malformed samples
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub days: Vec<DailySummary>,
    pub skipped: usize,
}

/// Local calendar date of a Unix timestamp in `tz`
pub fn local_date<Z: TimeZone>(timestamp: i64, tz: &Z) -> ForecastResult<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(tz).date_naive())
        .ok_or_else(|| ForecastError::InvalidInput(format!("timestamp out of range: {timestamp}")))
}

/// Group samples by local date, keeping first-seen date order.
///
/// Only the first [`FORECAST_DAYS`] buckets are returned.
pub fn bucket_by_date<Z: TimeZone>(samples: &[RawSample], tz: &Z) -> ForecastResult<Vec<DailyBucket>> {
    if samples.is_empty() {
        return Err(ForecastError::InvalidInput("no samples".into()));
    }

    let mut buckets: Vec<DailyBucket> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let date = local_date(sample.timestamp, tz)?;
        let slot = *index.entry(date).or_insert_with(|| {
            buckets.push(DailyBucket {
                date,
                samples: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].samples.push(sample.clone());
    }

    buckets.truncate(FORECAST_DAYS);
    Ok(buckets)
}

/// Most frequent label; on a tie the label that reached the count first wins
pub fn most_frequent<'a, I>(labels: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    let mut leader: Option<(&'a str, usize)> = None;

    for label in labels {
        let count = counts.entry(label).or_insert(0);
        *count += 1;
        let overtakes = match leader {
            Some((_, best)) => *count > best,
            None => true,
        };
        if overtakes {
            leader = Some((label, *count));
        }
    }

    leader.map(|(label, _)| label)
}

/// Reduce one bucket to its summary
pub fn reduce_bucket(bucket: &DailyBucket) -> ForecastResult<DailySummary> {
    let mut temperature = Accumulator::new();
    let mut humidity = Accumulator::new();
    let mut wind = Accumulator::new();

    for sample in &bucket.samples {
        temperature.add(sample.temperature);
        humidity.add(f64::from(sample.humidity));
        wind.add(sample.wind_speed);
    }

    let empty = || ForecastError::InvalidInput(format!("empty bucket for {}", bucket.date));
    let dominant = most_frequent(bucket.samples.iter().map(|s| s.condition.as_str()))
        .ok_or_else(empty)?;

    Ok(DailySummary {
        date: bucket.date,
        average_temperature: round_half_away(temperature.mean().ok_or_else(empty)?),
        dominant_condition: dominant.to_string(),
        average_humidity: round_half_away(humidity.mean().ok_or_else(empty)?).clamp(0, 255) as u8,
        average_wind_speed: round_half_away(wind.mean().ok_or_else(empty)?),
    })
}

/// Aggregate complete samples into at most [`FORECAST_DAYS`] summaries.
///
/// The first sample with an out-of-range field fails the whole call.
#[instrument(skip(samples, tz), fields(count = samples.len()))]
pub fn aggregate_daily<Z: TimeZone>(samples: &[RawSample], tz: &Z) -> ForecastResult<Vec<DailySummary>> {
    for (index, sample) in samples.iter().enumerate() {
        sample.validate(index)?;
    }
    let buckets = bucket_by_date(samples, tz)?;
    debug!(buckets = buckets.len(), "bucketed forecast samples");
    buckets.iter().map(reduce_bucket).collect()
}

/// Aggregate provider samples, skipping any with a missing or invalid field
pub fn aggregate_partial<Z: TimeZone>(
    samples: &[PartialSample],
    tz: &Z,
) -> ForecastResult<Aggregation> {
    let mut complete = Vec::with_capacity(samples.len());
    let mut skipped = 0;

    for (index, partial) in samples.iter().enumerate() {
        match partial.complete(index).and_then(|sample| {
            local_date(sample.timestamp, tz)?;
            Ok(sample)
        }) {
            Ok(sample) => complete.push(sample),
            Err(e) => {
                warn!(error = %e, "skipping forecast sample");
                skipped += 1;
            }
        }
    }

    if complete.is_empty() {
        return Err(ForecastError::InvalidInput(format!(
            "none of {} samples were usable",
            samples.len()
        )));
    }

    let days = aggregate_daily(&complete, tz)?;
    Ok(Aggregation { days, skipped })
}

/// Aggregate a provider feed and attach its metadata
pub fn build_report(
    feed: &ForecastFeed,
    tz: &chrono_tz::Tz,
    generated_at: DateTime<Utc>,
) -> ForecastResult<ForecastReport> {
    let aggregation = aggregate_partial(&feed.samples, tz)?;

    Ok(ForecastReport {
        place: feed.place.clone(),
        country: feed.country.clone(),
        generated_at,
        source: SOURCE_OPENWEATHERMAP.to_string(),
        timezone: tz.name().to_string(),
        skipped_samples: aggregation.skipped,
        days: aggregation.days,
    })
}
