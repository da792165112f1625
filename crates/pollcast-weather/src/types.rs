use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Base URL for provider condition icons
pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Geographic coordinates in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One aggregated forecast per calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Calendar day in the grouping time zone
    pub date: NaiveDate,
    /// Temperature of the representative sample, °C
    pub temperature: f64,
    /// Lowest `temp_min` across every sample of the day, °C
    pub temperature_min: f64,
    /// Highest `temp_max` across every sample of the day, °C
    pub temperature_max: f64,
    /// Localized description of the representative sample
    pub description: String,
    /// Provider icon code of the representative sample
    pub icon: String,
    /// Relative humidity of the representative sample, %
    pub humidity: u8,
    /// Wind speed of the representative sample, km/h
    pub wind_speed: f64,
}

impl DailyForecast {
    /// URL of the provider's 2x condition icon
    pub fn icon_url(&self) -> String {
        format!("{}/{}@2x.png", ICON_BASE_URL, self.icon)
    }

    /// Short one-line summary, e.g. `18°C - clear sky - Wind: 18 km/h - Humidity: 55%`
    pub fn tooltip(&self) -> String {
        format!(
            "{:.0}°C - {} - Wind: {:.0} km/h - Humidity: {}%",
            self.temperature, self.description, self.wind_speed, self.humidity
        )
    }
}

/// One match returned by the geocoding endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeMatch {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl GeocodeMatch {
    /// Place name with its country code when known, e.g. `Paris, FR`
    pub fn display_name(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

/// Forecast endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastSample>,
}

/// One time-stamped sample of the forecast series
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp, seconds
    pub dt: i64,
    pub main: SampleMain,
    #[serde(default)]
    pub weather: Vec<SampleCondition>,
    pub wind: SampleWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleWind {
    /// Metres per second
    pub speed: f64,
}
