//! Open-Meteo forecast API client
//!
//! This module fetches current conditions, a five-day daily series and the
//! hourly humidity series from the Open-Meteo API. The decoded payload is
//! what the forecast cache stores; merging happens in the aggregator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Coordinates, ForecastSource};
use crate::error::ProviderError;

/// Base URL for the Open-Meteo API
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Number of days in the daily series
const FORECAST_DAYS: u8 = 5;

const PROVIDER: &str = "open-meteo";

/// Decoded Open-Meteo forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    /// Offset of the location's timezone from UTC (`timezone=auto`)
    #[serde(default)]
    pub utc_offset_seconds: i64,
    pub current_weather: CurrentWeather,
    pub daily: DailySeries,
    pub hourly: HourlySeries,
}

/// Current conditions block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Wind speed in km/h
    pub windspeed: f64,
    /// WMO weather code
    pub weathercode: i32,
}

/// Daily series, one element per day, parallel arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub weathercode: Vec<i32>,
}

/// Hourly series in the location's local time (`YYYY-MM-DDTHH:MM`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub relative_humidity_2m: Vec<Option<f64>>,
}

impl ForecastPayload {
    /// Checks that the parallel arrays line up
    pub fn validate(&self) -> Result<(), ProviderError> {
        let daily = &self.daily;
        let days = daily.time.len();
        if daily.temperature_2m_max.len() != days
            || daily.temperature_2m_min.len() != days
            || daily.precipitation_sum.len() != days
            || daily.weathercode.len() != days
        {
            return Err(ProviderError::InvalidResponse(
                "daily arrays have inconsistent lengths".to_string(),
            ));
        }

        if self.hourly.relative_humidity_2m.len() != self.hourly.time.len() {
            return Err(ProviderError::InvalidResponse(
                "hourly arrays have inconsistent lengths".to_string(),
            ));
        }

        Ok(())
    }

    /// Today's precipitation sum, if the provider reported one
    pub fn today_precipitation(&self) -> Option<f64> {
        self.daily.precipitation_sum.first().copied().flatten()
    }
}

/// Client for fetching forecasts from the Open-Meteo API
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client that shares the given HTTP client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn forecast_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}?latitude={}&longitude={}&current_weather=true&daily=temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode&hourly=relative_humidity_2m&forecast_days={}&timezone=auto",
            self.base_url, coordinates.lat, coordinates.lon, FORECAST_DAYS
        )
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
    ) -> Result<ForecastPayload, ProviderError> {
        let response = self.client.get(self.forecast_url(coordinates)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let payload: ForecastPayload = serde_json::from_str(&text)?;
        payload.validate()?;

        Ok(payload)
    }
}
