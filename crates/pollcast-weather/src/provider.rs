//! Seams between the resolver/aggregator and the external weather provider.
//!
//! Each call is a single attempt; retrying is the caller's job.

use async_trait::async_trait;
use pollcast_core::NetworkError;

use crate::types::{Coordinates, ForecastResponse, GeocodeMatch};

/// Looks up place names.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Return the provider's matches for `query`, best first (at most one requested).
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, NetworkError>;
}

/// Fetches raw forecast series.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Return the multi-sample forecast series for `coords`.
    async fn forecast(&self, coords: Coordinates) -> Result<ForecastResponse, NetworkError>;
}
