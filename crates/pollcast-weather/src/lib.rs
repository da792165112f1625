//! Forecast acquisition for pollcast
//!
//! Resolves free-text locations through a memoized geocoder and condenses the
//! OpenWeatherMap 3-hourly forecast into cached daily summaries.

pub mod cache;
pub mod client;
pub mod forecast;
pub mod geocode;
pub mod provider;
pub mod retry;
pub mod service;
pub mod transform;
pub mod types;

pub use cache::{ForecastCache, GeocodeCache, MemoryGeocodeCache};
pub use client::OpenWeatherClient;
pub use forecast::{cache_key, ForecastAggregator};
pub use geocode::GeocodeResolver;
pub use provider::{ForecastProvider, GeocodeProvider};
pub use retry::RetryPolicy;
pub use service::{forecasts_by_date, select_range, within_overlay_window, WeatherService};
pub use transform::{date_key, DayBoundary};
pub use types::*;
