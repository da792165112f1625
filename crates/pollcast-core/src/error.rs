//! Centralized error types for pollcast.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for display
//! - Keeps transport details in `source()` for logging, out of user text

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Geocode(e) => e.user_message(),
            AppError::Forecast(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity, response decoding).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Geocoding errors.
///
/// Both variants share one fixed user message. The underlying transport
/// failure is only reachable through `source()`.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Unable to resolve location: no match for '{0}'")]
    NotFound(String),

    #[error("Unable to resolve location: geocoding service unavailable")]
    Unavailable {
        #[source]
        cause: NetworkError,
    },
}

impl GeocodeError {
    pub const USER_MESSAGE: &'static str =
        "Could not resolve the location. Check the place name and try again.";

    pub fn user_message(&self) -> &'static str {
        Self::USER_MESSAGE
    }
}

/// Forecast retrieval errors.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Unable to fetch the weather forecast")]
    Unavailable {
        #[source]
        cause: NetworkError,
    },
}

impl ForecastError {
    pub const USER_MESSAGE: &'static str =
        "Weather forecast unavailable. Please try again later.";

    pub fn user_message(&self) -> &'static str {
        Self::USER_MESSAGE
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_app_error_conversion() {
        let geo_err = GeocodeError::NotFound("Atlantis".into());
        let app_err: AppError = geo_err.into();
        assert!(matches!(app_err, AppError::Geocode(GeocodeError::NotFound(_))));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Forecast(ForecastError::Unavailable {
            cause: NetworkError::Timeout,
        });
        assert_eq!(app_err.user_message(), ForecastError::USER_MESSAGE);
    }

    #[test]
    fn test_geocode_user_message_is_fixed() {
        let not_found = GeocodeError::NotFound("Atlantis".into());
        let unavailable = GeocodeError::Unavailable {
            cause: NetworkError::ServerError {
                status: 500,
                message: "Internal Server Error".into(),
            },
        };
        assert_eq!(not_found.user_message(), unavailable.user_message());
        assert!(not_found.user_message().contains("Could not resolve the location"));
    }

    #[test]
    fn test_geocode_display_hides_transport_text() {
        let err = GeocodeError::Unavailable {
            cause: NetworkError::ConnectionFailed("dns error: lookup failed".into()),
        };
        let shown = err.to_string();
        assert!(shown.contains("Unable to resolve location"));
        assert!(!shown.contains("dns error"));

        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("dns error"));
    }

    #[test]
    fn test_config_error_conversion() {
        let app_err: AppError = ConfigError::Invalid("Unknown time zone".into()).into();
        assert!(app_err.to_string().contains("Unknown time zone"));
        assert_eq!(app_err.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_forecast_and_geocode_messages_differ() {
        assert_ne!(GeocodeError::USER_MESSAGE, ForecastError::USER_MESSAGE);
    }

    #[test]
    fn test_server_error_user_message_depends_on_status() {
        let server = NetworkError::ServerError { status: 503, message: String::new() };
        let client = NetworkError::ServerError { status: 401, message: String::new() };
        assert!(server.user_message().contains("later"));
        assert_eq!(client.user_message(), "The request failed. Please try again.");
    }
}
