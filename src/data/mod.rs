//! Core data models for the weather layer
//!
//! This module contains the coordinate types used to key caches, the
//! normalized weather report returned to callers, and the provider seams
//! the aggregator talks to.

pub mod open_meteo;
pub mod tomorrow;
pub mod weather_code;

pub use open_meteo::{ForecastPayload, OpenMeteoClient};
pub use tomorrow::{RealtimePayload, RealtimeValues, TomorrowClient};
pub use weather_code::condition_label;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true when both values are finite and inside the valid
    /// latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Derives the cache key for these coordinates
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::from(*self)
    }
}

/// Cache key built from coordinates rounded to two decimal places
///
/// Nearby reads (roughly within a kilometre) collapse onto one key, so the
/// rounding precision directly controls the cache hit rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey(String);

impl CoordinateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Coordinates> for CoordinateKey {
    fn from(coordinates: Coordinates) -> Self {
        Self(format!(
            "{}_{}",
            two_decimals(coordinates.lat),
            two_decimals(coordinates.lon)
        ))
    }
}

/// Renders `value` with two decimals, rounding exact ties away from zero
///
/// `{:.2}` rounds exact ties to even, so 0.125 would become "0.12" where the
/// browser client's keys read "0.13".
fn two_decimals(value: f64) -> String {
    if value == 0.0 {
        return "0.00".to_string();
    }

    // The only exact binary ties at two decimals are odd multiples of 1/8
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let hundredths = (value.abs() * 100.0).ceil().copysign(value);
        return format!("{:.2}", hundredths / 100.0);
    }

    format!("{value:.2}")
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Merged weather for one location, always fully populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    /// Current temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage for the current hour
    pub humidity: f64,
    /// Rainfall in mm (instantaneous intensity when available)
    pub rainfall: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// UV index
    pub uv_index: f64,
    /// Human-readable current condition
    pub condition: String,
    /// Daily forecast in chronological order
    pub forecast: Vec<ForecastDay>,
}

/// One day of the multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date (YYYY-MM-DD) in the location's timezone
    pub date: String,
    pub temperature: TemperatureRange,
    pub condition: String,
    /// Precipitation sum in mm
    pub rainfall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub max: f64,
    pub min: f64,
}

/// Mandatory source of current conditions and the daily forecast
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, coordinates: Coordinates)
        -> Result<ForecastPayload, ProviderError>;
}

/// Optional source of high-fidelity realtime values
#[async_trait]
pub trait RealtimeSource: Send + Sync {
    /// Whether the source can be called at all (e.g. an API key is present)
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_realtime(&self, coordinates: Coordinates)
        -> Result<RealtimePayload, ProviderError>;
}
