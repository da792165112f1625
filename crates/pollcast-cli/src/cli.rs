//! Command-line interface parsing and output formatting for pollcast.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pollcast_weather::{date_key, DailyForecast};

/// pollcast - daily weather forecasts for poll locations
#[derive(Parser, Debug)]
#[command(name = "pollcast")]
#[command(about = "Resolve locations and show condensed daily weather forecasts")]
#[command(version)]
pub struct Cli {
    /// Use this configuration file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a place name to coordinates
    Geocode {
        /// Free-text place name, e.g. "Rennes" or "Paris, FR"
        location: String,
    },

    /// Show daily forecasts for a place
    ///
    /// Examples:
    ///   pollcast forecast Paris
    ///   pollcast forecast Lyon --from 2024-06-01 --to 2024-06-03
    ///   pollcast forecast Nantes --json
    Forecast(ForecastArgs),

    /// Show or check the configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Free-text place name
    pub location: String,

    /// First day to show (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day to show (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ForecastArgs {
    /// Whether a date range was requested
    pub fn has_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Requested range with open ends filled in
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (
            self.from.unwrap_or(NaiveDate::MIN),
            self.to.unwrap_or(NaiveDate::MAX),
        )
    }
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct ConfigArgs {
    /// Print the configuration file path only
    #[arg(long)]
    pub path: bool,

    /// Validate the configuration and report problems
    #[arg(long)]
    pub check: bool,
}

/// One line per day: date, then the short summary
pub fn render_table(forecasts: &[DailyForecast]) -> String {
    forecasts
        .iter()
        .map(|f| {
            format!(
                "{}  {:>5.1}°C ({:.0}..{:.0})  {}",
                date_key(f.date),
                f.temperature,
                f.temperature_min,
                f.temperature_max,
                f.tooltip()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hide all but the last four characters of a credential
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), visible)
}
