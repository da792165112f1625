//! Forecast fetch, daily aggregation and caching.

use std::sync::Arc;

use pollcast_core::ForecastError;

use crate::cache::ForecastCache;
use crate::provider::ForecastProvider;
use crate::retry::{with_retry, RetryPolicy};
use crate::transform::{DayBoundary, MAX_FORECAST_DAYS};
use crate::types::{Coordinates, DailyForecast};

/// Cache key for a coordinate pair: both values as given, unrounded.
///
/// Nearby points never share an entry, even when they would round to the
/// same place.
pub fn cache_key(lat: f64, lon: f64) -> String {
    format!("{},{}", lat, lon)
}

/// Fetches forecasts and condenses them into at most `max_days` daily summaries.
pub struct ForecastAggregator {
    provider: Arc<dyn ForecastProvider>,
    cache: ForecastCache,
    retry: RetryPolicy,
    day_boundary: DayBoundary,
    max_days: usize,
}

impl ForecastAggregator {
    pub fn new(provider: Arc<dyn ForecastProvider>, cache: ForecastCache, retry: RetryPolicy) -> Self {
        Self {
            provider,
            cache,
            retry,
            day_boundary: DayBoundary::default(),
            max_days: MAX_FORECAST_DAYS,
        }
    }

    /// Group days in the given zone instead of host local time
    pub fn with_day_boundary(mut self, day_boundary: DayBoundary) -> Self {
        self.day_boundary = day_boundary;
        self
    }

    /// Lower the number of days returned; values above five are capped.
    pub fn with_max_days(mut self, max_days: usize) -> Self {
        if max_days > MAX_FORECAST_DAYS {
            tracing::warn!(
                "Requested {} forecast days, capping at {}",
                max_days,
                MAX_FORECAST_DAYS
            );
        }
        self.max_days = max_days.min(MAX_FORECAST_DAYS);
        self
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    pub fn day_boundary(&self) -> DayBoundary {
        self.day_boundary
    }

    /// Daily forecasts for a coordinate pair, from cache when fresh.
    ///
    /// A failed fetch never falls back to an expired entry.
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<DailyForecast>, ForecastError> {
        let key = cache_key(lat, lon);
        if let Some(forecasts) = self.cache.get(&key) {
            tracing::debug!("Forecast cache hit for {}", key);
            return Ok(forecasts);
        }

        tracing::debug!("Forecast cache miss for {}", key);
        let coords = Coordinates::new(lat, lon);
        let response = with_retry(&self.retry, "Forecast request", || {
            self.provider.forecast(coords)
        })
        .await
        .map_err(|cause| {
            tracing::error!("Fetching forecast for {} failed: {}", key, cause);
            ForecastError::Unavailable { cause }
        })?;

        let forecasts = self.day_boundary.summarize(&response.list, self.max_days);
        tracing::info!(
            "Fetched {} samples for {}, cached {} daily forecasts",
            response.list.len(),
            key,
            forecasts.len()
        );
        self.cache.insert(key, forecasts.clone());
        Ok(forecasts)
    }
}
