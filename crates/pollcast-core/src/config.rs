use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `weather.api_key`
pub const API_KEY_ENV: &str = "POLLCAST_WEATHER_API_KEY";

/// Upper bound for `weather.max_days`
pub const MAX_FORECAST_DAYS: usize = 5;

const CONFIG_DIR_NAME: &str = "pollcast";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider and cache settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider, retry and cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider credential (`appid`). Can be set via `POLLCAST_WEATHER_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// Provider base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Language for localized forecast descriptions
    #[serde(default = "default_language")]
    pub language: String,

    /// Forecast cache lifetime after insertion, in minutes
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,

    /// Additional attempts after a failed request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between attempts, in milliseconds (0 = immediate resubmission)
    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Maximum number of daily summaries returned
    #[serde(default = "default_max_days")]
    pub max_days: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// IANA time zone used for day grouping (host local time when unset)
    #[serde(default)]
    pub timezone: Option<String>,
}

fn default_api_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_cache_ttl_minutes() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_max_days() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            language: default_language(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            max_retries: default_max_retries(),
            retry_delay_ms: 0,
            max_days: default_max_days(),
            request_timeout_secs: default_request_timeout_secs(),
            timezone: None,
        }
    }
}

impl WeatherConfig {
    /// Check if a credential is configured (not a placeholder)
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_key.starts_with("YOUR_")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, creating a default one if missing.
    ///
    /// The `POLLCAST_WEATHER_API_KEY` environment variable, when set, replaces
    /// the stored credential.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Created default configuration at {}", path.display());
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = key;
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load_validated_from(&Self::config_path()?)
    }

    /// Same as [`Config::load_validated`] for a specific file
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let weather = &self.weather;

        self.validate_url(&weather.api_base_url, "weather.api_base_url", &mut result);

        if !weather.has_api_key() {
            result.add_warning(
                "weather.api_key",
                format!("No API key configured - set it here or via {}", API_KEY_ENV),
            );
        }

        if weather.language.trim().is_empty() {
            result.add_error("weather.language", "Language must not be empty");
        }

        if weather.cache_ttl_minutes == 0 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Forecast caching disabled (0 minutes)",
            );
        } else if weather.cache_ttl_minutes > 1440 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Forecast cache lifetime is more than 24 hours",
            );
        }

        if weather.max_retries > 10 {
            result.add_error("weather.max_retries", "At most 10 retries are allowed");
        }

        if weather.max_days == 0 {
            result.add_error("weather.max_days", "At least one forecast day is required");
        } else if weather.max_days > MAX_FORECAST_DAYS {
            result.add_error(
                "weather.max_days",
                format!("At most {} forecast days are available", MAX_FORECAST_DAYS),
            );
        }

        if weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if let Some(tz) = &weather.timezone {
            if tz.parse::<chrono_tz::Tz>().is_err() {
                result.add_error("weather.timezone", format!("Unknown time zone: {}", tz));
            }
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            result.add_error(
                "logging.level",
                format!("Invalid log filter: {}", self.logging.level),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }
}
