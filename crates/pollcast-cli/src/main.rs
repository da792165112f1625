//! pollcast - forecast lookup for poll locations
//!
//! Resolves a place name through the configured weather provider and prints
//! up to five condensed daily forecasts.

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use pollcast_core::{AppError, Config};
use pollcast_weather::WeatherService;

use cli::{mask_secret, render_table, Cli, Command, ConfigArgs, ForecastArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    match cli.command {
        Command::Config(args) => run_config(&config_path, &args),
        Command::Geocode { location } => {
            let service = start_service(&config_path)?;
            let coords = service
                .resolve_location(&location)
                .await
                .map_err(|e| report(e.into()))?;
            println!("{}: {}, {}", location, coords.lat, coords.lon);
            Ok(())
        }
        Command::Forecast(args) => {
            let service = start_service(&config_path)?;
            run_forecast(&service, &args).await
        }
    }
}

/// Load and validate the configuration, start logging and build the service
fn start_service(config_path: &Path) -> Result<WeatherService> {
    let config = Config::load_from(config_path)?;
    pollcast_core::init_logging(&config.logging)?;
    tracing::debug!("Using configuration {}", config_path.display());

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        anyhow::bail!(
            "Configuration validation failed: {}",
            validation.error_summary()
        );
    }

    WeatherService::from_config(&config.weather).map_err(report)
}

async fn run_forecast(service: &WeatherService, args: &ForecastArgs) -> Result<()> {
    let forecasts = if args.has_range() {
        let (start, end) = args.range();
        service.forecast_for_range(&args.location, start, end).await
    } else {
        service.forecast_for_location(&args.location).await
    }
    .map_err(report)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&forecasts)?);
    } else if forecasts.is_empty() {
        println!("No forecast available for {}", args.location);
    } else {
        println!("{}", render_table(&forecasts));
    }
    Ok(())
}

fn run_config(config_path: &Path, args: &ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", config_path.display());
        return Ok(());
    }

    let config = Config::load_from(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    if args.check {
        let validation = config.validate();
        for warning in &validation.warnings {
            println!("warning: {}", warning);
        }
        for error in &validation.errors {
            println!("error: {}", error);
        }
        if !validation.is_valid() {
            anyhow::bail!("{} configuration error(s)", validation.errors.len());
        }
        println!("Configuration OK: {}", config_path.display());
        return Ok(());
    }

    let mut shown = config;
    shown.weather.api_key = mask_secret(&shown.weather.api_key);
    println!("# {}", config_path.display());
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

/// Log the full error chain, keep only the user-facing message for display
fn report(err: AppError) -> anyhow::Error {
    let mut chain = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    tracing::error!("{}", chain);
    anyhow::anyhow!(err.user_message())
}
