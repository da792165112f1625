//! Collapses a provider forecast series into one summary per calendar day.
//!
//! Grouping rules:
//! - samples are grouped by their calendar day in the day-boundary time zone
//! - the first sample of a day is its representative until a sample whose
//!   local hour is in [`BEST_TIME_HOURS`] shows up; every such sample replaces
//!   the representative, so the last one wins
//! - min/max temperatures aggregate over every sample of the day
//! - days keep first-seen order and the list is cut to `max_days`

use std::collections::HashMap;
use std::ops::RangeInclusive;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike, Utc};
pub use pollcast_core::MAX_FORECAST_DAYS;

use crate::types::{DailyForecast, ForecastSample};

/// Local hours considered close enough to midday to represent the day
pub const BEST_TIME_HOURS: RangeInclusive<u32> = 11..=14;

/// m/s to km/h
pub const KMH_PER_MS: f64 = 3.6;


/// Time zone whose midnight separates forecast days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    /// The host's local time zone
    #[default]
    Local,
    /// A fixed IANA time zone
    Zone(chrono_tz::Tz),
}

impl DayBoundary {
    /// Parse an optional IANA zone name; `None` means host local time.
    pub fn from_name(name: Option<&str>) -> Result<Self, String> {
        match name {
            None => Ok(Self::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(Self::Zone)
                .map_err(|e| format!("Unknown time zone '{}': {}", name, e)),
        }
    }

    /// Group `samples` into at most `max_days` daily summaries.
    pub fn summarize(&self, samples: &[ForecastSample], max_days: usize) -> Vec<DailyForecast> {
        match self {
            Self::Local => daily_summaries(samples, &Local, max_days),
            Self::Zone(tz) => daily_summaries(samples, tz, max_days),
        }
    }

    /// Today's date in this time zone
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self {
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::Zone(tz) => now.with_timezone(tz).date_naive(),
        }
    }
}

/// Whether a local hour falls in the midday window
pub fn is_best_time(hour: u32) -> bool {
    BEST_TIME_HOURS.contains(&hour)
}

/// Group `samples` by calendar day in `tz` and build one summary per day.
pub fn daily_summaries<Tz: TimeZone>(
    samples: &[ForecastSample],
    tz: &Tz,
    max_days: usize,
) -> Vec<DailyForecast> {
    let mut days: Vec<DailyForecast> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let Some(utc) = DateTime::<Utc>::from_timestamp(sample.dt, 0) else {
            tracing::warn!("Skipping forecast sample with out-of-range timestamp {}", sample.dt);
            continue;
        };
        let local = utc.with_timezone(tz);
        let date = local.date_naive();

        match index.get(&date) {
            None => {
                index.insert(date, days.len());
                days.push(new_summary(date, sample));
            }
            Some(&i) => {
                let day = &mut days[i];
                if is_best_time(local.hour()) {
                    apply_representative(day, sample);
                }
                day.temperature_min = day.temperature_min.min(sample.main.temp_min);
                day.temperature_max = day.temperature_max.max(sample.main.temp_max);
            }
        }
    }

    days.truncate(max_days);
    days
}

fn new_summary(date: NaiveDate, sample: &ForecastSample) -> DailyForecast {
    let mut day = DailyForecast {
        date,
        temperature: 0.0,
        temperature_min: sample.main.temp_min,
        temperature_max: sample.main.temp_max,
        description: String::new(),
        icon: String::new(),
        humidity: 0,
        wind_speed: 0.0,
    };
    apply_representative(&mut day, sample);
    day
}

/// Copy the headline fields of `sample` into `day`. Min/max are left alone.
fn apply_representative(day: &mut DailyForecast, sample: &ForecastSample) {
    let (description, icon) = match sample.weather.first() {
        Some(condition) => (condition.description.clone(), condition.icon.clone()),
        None => {
            tracing::debug!("Forecast sample at {} has no weather condition", sample.dt);
            (String::new(), String::new())
        }
    };

    day.temperature = sample.main.temp;
    day.description = description;
    day.icon = icon;
    day.humidity = sample.main.humidity;
    day.wind_speed = sample.wind.speed * KMH_PER_MS;
}

/// Render a date as `YYYY-MM-DD`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
