//! Command-line interface parsing for farmweather
//!
//! `serve` runs the aggregation server. `current` runs the client tier:
//! it consults the persisted result cache and only goes to the server when
//! the cached report is stale.

use std::fmt::Write as _;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::advice::{irrigation_advice, rain_outlook};
use crate::data::{Coordinates, WeatherReport};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// Flags parsed but do not form a usable location
    #[error("Invalid coordinates: lat {lat} must be within [-90, 90] and lon {lon} within [-180, 180]")]
    InvalidCoordinates { lat: f64, lon: f64 },
}

/// Farm weather - merged conditions, forecast and irrigation hints
#[derive(Parser, Debug)]
#[command(name = "farmweather")]
#[command(about = "Dual-source farm weather server and cached client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the weather server (POST /weather, /chat, /disease)
    Serve(ServeArgs),
    /// Show current weather for a location, served from cache when fresh
    Current(CurrentArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub struct CurrentArgs {
    /// Latitude in decimal degrees; without it the location is looked up by IP
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Print the raw report as JSON
    #[arg(long)]
    pub json: bool,

    /// Ignore the cached report and fetch a fresh one
    #[arg(long)]
    pub refresh: bool,

    /// Weather server base URL (overrides WEATHER_SERVER_URL)
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,
}

/// Validated options for the `current` command
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentOptions {
    /// Fixed location, or `None` to geolocate
    pub location: Option<Coordinates>,
    pub json: bool,
    pub refresh: bool,
    pub server_url: Option<String>,
}

impl CurrentOptions {
    /// Validates parsed `current` arguments
    ///
    /// # Returns
    /// * `Ok(CurrentOptions)` when the location (if given) is in range
    /// * `Err(CliError::InvalidCoordinates)` otherwise
    pub fn from_args(args: &CurrentArgs) -> Result<Self, CliError> {
        let location = match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => {
                let coordinates = Coordinates::new(lat, lon);
                if !coordinates.is_valid() {
                    return Err(CliError::InvalidCoordinates { lat, lon });
                }
                Some(coordinates)
            }
            _ => None,
        };

        Ok(Self {
            location,
            json: args.json,
            refresh: args.refresh,
            server_url: args.server.clone(),
        })
    }
}

/// Human-readable rendering of a report with irrigation hints
pub fn format_report(report: &WeatherReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}, {:.1}°C", report.condition, report.temperature);
    let _ = writeln!(
        out,
        "Humidity {:.0}%  Wind {:.1} km/h  UV {:.1}  Rainfall {:.1} mm",
        report.humidity, report.wind_speed, report.uv_index, report.rainfall
    );
    let _ = writeln!(out, "Irrigation: {}", irrigation_advice(report));
    let _ = writeln!(out, "Outlook: {}", rain_outlook(report));

    if !report.forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Forecast:");
        for day in &report.forecast {
            let _ = writeln!(
                out,
                "  {}  {:<14} {:>5.1}° / {:>5.1}°  {:>5.1} mm",
                day.date, day.condition, day.temperature.max, day.temperature.min, day.rainfall
            );
        }
    }

    out
}
