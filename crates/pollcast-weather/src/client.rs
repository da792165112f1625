//! OpenWeatherMap HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pollcast_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::provider::{ForecastProvider, GeocodeProvider};
use crate::types::{Coordinates, ForecastResponse, GeocodeMatch};

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const USER_AGENT: &str = concat!("pollcast/", env!("CARGO_PKG_VERSION"));

/// Client for the geocoding and 5-day forecast endpoints
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    language: String,
}

impl OpenWeatherClient {
    /// Build a client from weather settings.
    pub fn new(config: &WeatherConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a GET, require a 2xx status and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NetworkError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", path, status);
            let message = response.text().await.unwrap_or_else(|e| {
                tracing::debug!("Failed to read error body from {}: {}", path, e);
                String::new()
            });
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await.map_err(|e| e.into_network_error())?;
        serde_json::from_str(&text).map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GeocodeProvider for OpenWeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, NetworkError> {
        let params = [
            ("q", query.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];
        let matches: Vec<GeocodeMatch> = self.get_json(GEOCODE_PATH, &params).await?;
        tracing::debug!("Geocoding returned {} match(es)", matches.len());
        Ok(matches)
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn forecast(&self, coords: Coordinates) -> Result<ForecastResponse, NetworkError> {
        let params = [
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
            ("lang", self.language.clone()),
        ];
        let response: ForecastResponse = self.get_json(FORECAST_PATH, &params).await?;
        tracing::debug!("Forecast returned {} sample(s)", response.list.len());
        Ok(response)
    }
}
