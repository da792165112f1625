//! Entry points for hosts: location in, daily forecasts out.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pollcast_core::{AppError, ConfigError, GeocodeError, WeatherConfig};

use crate::cache::ForecastCache;
use crate::client::OpenWeatherClient;
use crate::forecast::ForecastAggregator;
use crate::geocode::GeocodeResolver;
use crate::provider::{ForecastProvider, GeocodeProvider};
use crate::retry::RetryPolicy;
use crate::transform::DayBoundary;
use crate::types::{Coordinates, DailyForecast};

/// Days ahead of today that can carry a forecast, today included as day 0
pub const OVERLAY_HORIZON_DAYS: i64 = 5;

/// Whether `date` is between today and the overlay horizon
pub fn within_overlay_window(date: NaiveDate, today: NaiveDate) -> bool {
    (0..=OVERLAY_HORIZON_DAYS).contains(&(date - today).num_days())
}

/// Keep the summaries dated in `[start, end]` that fall inside the overlay window.
pub fn select_range(
    forecasts: &[DailyForecast],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<DailyForecast> {
    forecasts
        .iter()
        .filter(|f| f.date >= start && f.date <= end)
        .filter(|f| within_overlay_window(f.date, today))
        .cloned()
        .collect()
}

/// Index summaries by date; a later entry for the same date replaces an earlier one.
pub fn forecasts_by_date(forecasts: &[DailyForecast]) -> BTreeMap<NaiveDate, DailyForecast> {
    forecasts.iter().map(|f| (f.date, f.clone())).collect()
}

/// Resolver and aggregator wired to one provider, with caches owned by this instance.
pub struct WeatherService {
    resolver: GeocodeResolver,
    aggregator: ForecastAggregator,
}

impl WeatherService {
    /// Build a service backed by the OpenWeatherMap HTTP client.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, AppError> {
        if !config.has_api_key() {
            tracing::warn!("No weather API key configured; provider requests will be rejected");
        }
        let client = Arc::new(OpenWeatherClient::new(config)?);
        Self::with_providers(client.clone(), client, config)
    }

    /// Build a service around arbitrary providers.
    pub fn with_providers(
        geocoder: Arc<dyn GeocodeProvider>,
        forecaster: Arc<dyn ForecastProvider>,
        config: &WeatherConfig,
    ) -> Result<Self, AppError> {
        let day_boundary =
            DayBoundary::from_name(config.timezone.as_deref()).map_err(ConfigError::Invalid)?;
        let retry = RetryPolicy::from_config(config);
        let ttl = Duration::from_secs(config.cache_ttl_minutes.saturating_mul(60));

        let resolver = GeocodeResolver::new(geocoder, retry);
        let aggregator = ForecastAggregator::new(forecaster, ForecastCache::new(ttl), retry)
            .with_day_boundary(day_boundary)
            .with_max_days(config.max_days);

        tracing::debug!(
            "Weather service ready (ttl {:?}, {} retries, {:?})",
            ttl,
            retry.max_retries,
            day_boundary
        );
        Ok(Self {
            resolver,
            aggregator,
        })
    }

    pub fn resolver(&self) -> &GeocodeResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &ForecastAggregator {
        &self.aggregator
    }

    /// Resolve `location`, rejecting blank input before any request.
    pub async fn resolve_location(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        if location.trim().is_empty() {
            return Err(GeocodeError::NotFound(location.to_string()));
        }
        self.resolver.resolve(location).await
    }

    /// Resolve `location` and return its daily forecasts.
    pub async fn forecast_for_location(
        &self,
        location: &str,
    ) -> Result<Vec<DailyForecast>, AppError> {
        let coords = self.resolve_location(location).await?;
        Ok(self.aggregator.forecast(coords.lat, coords.lon).await?)
    }

    /// Forecasts for `location` dated in `[start, end]`, limited to the next
    /// few days in the aggregator's time zone.
    pub async fn forecast_for_range(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyForecast>, AppError> {
        let forecasts = self.forecast_for_location(location).await?;
        let today = self.aggregator.day_boundary().today();
        Ok(select_range(&forecasts, start, end, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ForecastResponse, ForecastSample, GeocodeMatch, SampleCondition, SampleMain, SampleWind,
    };
    use async_trait::async_trait;
    use chrono::{Days, Utc};
    use parking_lot::Mutex;
    use pollcast_core::NetworkError;

    /// Fixed provider: one match for any query, one midday sample per day
    /// starting today (UTC).
    #[derive(Default)]
    struct FixedProvider {
        geocode_calls: Mutex<u32>,
        forecast_calls: Mutex<u32>,
    }

    #[async_trait]
    impl GeocodeProvider for FixedProvider {
        async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, NetworkError> {
            *self.geocode_calls.lock() += 1;
            Ok(vec![GeocodeMatch {
                lat: 48.8566,
                lon: 2.3522,
                name: query.to_string(),
                country: None,
            }])
        }
    }

    #[async_trait]
    impl ForecastProvider for FixedProvider {
        async fn forecast(&self, _coords: Coordinates) -> Result<ForecastResponse, NetworkError> {
            *self.forecast_calls.lock() += 1;
            let today = Utc::now().date_naive();
            let list = (0..5)
                .map(|offset| ForecastSample {
                    dt: (today + Days::new(offset))
                        .and_hms_opt(12, 0, 0)
                        .unwrap()
                        .and_utc()
                        .timestamp(),
                    main: SampleMain {
                        temp: 15.0 + offset as f64,
                        temp_min: 10.0,
                        temp_max: 20.0,
                        humidity: 50,
                    },
                    weather: vec![SampleCondition {
                        description: "ciel dégagé".to_string(),
                        icon: "01d".to_string(),
                    }],
                    wind: SampleWind { speed: 2.0 },
                })
                .collect();
            Ok(ForecastResponse { list })
        }
    }

    fn utc_config() -> WeatherConfig {
        WeatherConfig {
            timezone: Some("UTC".to_string()),
            ..WeatherConfig::default()
        }
    }

    fn forecast(date: NaiveDate) -> DailyForecast {
        DailyForecast {
            date,
            temperature: 18.0,
            temperature_min: 10.0,
            temperature_max: 20.0,
            description: "ciel dégagé".to_string(),
            icon: "01d".to_string(),
            humidity: 55,
            wind_speed: 18.0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overlay_window_bounds() {
        let today = date(2024, 1, 15);
        assert!(!within_overlay_window(date(2024, 1, 14), today));
        assert!(within_overlay_window(today, today));
        assert!(within_overlay_window(date(2024, 1, 20), today));
        assert!(!within_overlay_window(date(2024, 1, 21), today));
    }

    #[test]
    fn test_select_range_filters_by_range_and_window() {
        let today = date(2024, 1, 15);
        let forecasts: Vec<_> = (14..=21).map(|d| forecast(date(2024, 1, d))).collect();

        let selected = select_range(&forecasts, date(2024, 1, 10), date(2024, 1, 18), today);

        let dates: Vec<_> = selected.iter().map(|f| f.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 15), date(2024, 1, 16), date(2024, 1, 17), date(2024, 1, 18)]
        );
    }

    #[test]
    fn test_forecasts_by_date_indexes_each_day() {
        let forecasts = vec![forecast(date(2024, 1, 16)), forecast(date(2024, 1, 15))];

        let index = forecasts_by_date(&forecasts);

        assert_eq!(index.len(), 2);
        assert_eq!(index.keys().next(), Some(&date(2024, 1, 15)));
        assert!(index.contains_key(&date(2024, 1, 16)));
    }

    #[tokio::test]
    async fn test_blank_location_rejected_without_requests() {
        let provider = Arc::new(FixedProvider::default());
        let service =
            WeatherService::with_providers(provider.clone(), provider.clone(), &utc_config())
                .unwrap();

        let err = service.forecast_for_location("   ").await.unwrap_err();

        assert!(matches!(err, AppError::Geocode(GeocodeError::NotFound(_))));
        assert_eq!(*provider.geocode_calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_blank_geocode_query_rejected_without_caching() {
        let provider = Arc::new(FixedProvider::default());
        let service =
            WeatherService::with_providers(provider.clone(), provider.clone(), &utc_config())
                .unwrap();

        let err = service.resolve_location("   ").await.unwrap_err();

        assert!(matches!(err, GeocodeError::NotFound(_)));
        assert_eq!(*provider.geocode_calls.lock(), 0);
        assert!(service.resolver().cache().is_empty());
    }

    #[tokio::test]
    async fn test_forecast_for_location_chains_and_caches() {
        let provider = Arc::new(FixedProvider::default());
        let service =
            WeatherService::with_providers(provider.clone(), provider.clone(), &utc_config())
                .unwrap();

        let first = service.forecast_for_location("Paris").await.unwrap();
        let second = service.forecast_for_location("Paris").await.unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(*provider.geocode_calls.lock(), 1);
        assert_eq!(*provider.forecast_calls.lock(), 1);
        assert_eq!(service.aggregator().cache().len(), 1);
    }

    #[tokio::test]
    async fn test_forecast_for_range_limits_dates() {
        let provider = Arc::new(FixedProvider::default());
        let service =
            WeatherService::with_providers(provider.clone(), provider.clone(), &utc_config())
                .unwrap();
        let today = Utc::now().date_naive();

        let days = service
            .forecast_for_range("Paris", today + Days::new(1), today + Days::new(2))
            .await
            .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, today + Days::new(1));
        assert_eq!(days[0].temperature, 16.0);
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let provider = Arc::new(FixedProvider::default());
        let config = WeatherConfig {
            timezone: Some("Mars/Olympus".to_string()),
            ..WeatherConfig::default()
        };

        let result = WeatherService::with_providers(provider.clone(), provider, &config);

        assert!(matches!(result, Err(AppError::Config(ConfigError::Invalid(_)))));
    }
}
