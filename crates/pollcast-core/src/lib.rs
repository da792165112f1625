//! Shared foundation for pollcast: configuration, error hierarchy and logging.

pub mod config;
pub mod error;

pub use config::{
    Config, LoggingConfig, ValidationResult, WeatherConfig, API_KEY_ENV, MAX_FORECAST_DAYS,
};
pub use error::{
    AppError, ConfigError, ForecastError, GeocodeError, NetworkError, ReqwestErrorExt,
};

use anyhow::Result;

/// Initialize tracing/logging.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Logging initialized");
    Ok(())
}
