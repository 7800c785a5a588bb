//! Weather aggregation across the primary and secondary providers
//!
//! The primary provider (Open-Meteo) is mandatory and supplies temperature,
//! wind, condition, humidity and the daily forecast. The secondary provider
//! (Tomorrow.io) is optional and, when it answers, overrides rainfall and
//! supplies the UV index. Both are consulted through their own
//! [`SourceCache`], primary first, then secondary.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::cache::SourceCache;
use crate::data::open_meteo::{DailySeries, ForecastPayload};
use crate::data::{
    condition_label, Coordinates, CoordinateKey, ForecastDay, ForecastSource, RealtimePayload,
    RealtimeSource, RealtimeValues, TemperatureRange, WeatherReport,
};
use crate::error::ProviderError;

/// Builds normalized weather reports from the two providers
pub struct Aggregator {
    primary: Arc<dyn ForecastSource>,
    secondary: Arc<dyn RealtimeSource>,
    forecast_cache: SourceCache<ForecastPayload>,
    realtime_cache: SourceCache<RealtimePayload>,
}

impl Aggregator {
    pub fn new(
        primary: Arc<dyn ForecastSource>,
        secondary: Arc<dyn RealtimeSource>,
        forecast_cache: SourceCache<ForecastPayload>,
        realtime_cache: SourceCache<RealtimePayload>,
    ) -> Self {
        Self {
            primary,
            secondary,
            forecast_cache,
            realtime_cache,
        }
    }

    pub fn forecast_cache(&self) -> &SourceCache<ForecastPayload> {
        &self.forecast_cache
    }

    pub fn realtime_cache(&self) -> &SourceCache<RealtimePayload> {
        &self.realtime_cache
    }

    /// Aggregate weather for `coordinates` at the current instant
    ///
    /// # Errors
    /// Fails only when the primary provider cannot be reached or returns an
    /// unusable payload. Secondary failures degrade to primary-only values.
    pub async fn aggregate(&self, coordinates: Coordinates) -> Result<WeatherReport, ProviderError> {
        self.aggregate_at(coordinates, Utc::now()).await
    }

    /// [`aggregate`](Self::aggregate) evaluated at the instant `now`
    pub async fn aggregate_at(
        &self,
        coordinates: Coordinates,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, ProviderError> {
        let key = coordinates.key();

        let forecast = self
            .forecast_cache
            .get_or_fetch_at(&key, now, || self.primary.fetch_forecast(coordinates))
            .await?;
        forecast.validate()?;

        let humidity = current_humidity(&forecast, now);
        let days = build_forecast(&forecast.daily);

        let realtime = self.realtime_values(coordinates, &key, now).await;

        let rainfall = realtime
            .precipitation_intensity
            .or_else(|| forecast.today_precipitation())
            .unwrap_or(0.0);
        let uv_index = realtime.uv_index.unwrap_or(0.0);

        Ok(WeatherReport {
            temperature: forecast.current_weather.temperature,
            humidity,
            rainfall,
            wind_speed: forecast.current_weather.windspeed,
            uv_index,
            condition: condition_label(forecast.current_weather.weathercode).to_string(),
            forecast: days,
        })
    }

    /// Drop stale entries from both source caches
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.forecast_cache.purge_expired(now) + self.realtime_cache.purge_expired(now)
    }

    /// Secondary values, or empty values when the provider is unavailable
    async fn realtime_values(
        &self,
        coordinates: Coordinates,
        key: &CoordinateKey,
        now: DateTime<Utc>,
    ) -> RealtimeValues {
        if !self.secondary.is_configured() {
            debug!("secondary provider not configured, skipping");
            return RealtimeValues::default();
        }

        match self
            .realtime_cache
            .get_or_fetch_at(key, now, || self.secondary.fetch_realtime(coordinates))
            .await
        {
            Ok(payload) => payload.values(),
            Err(e) => {
                warn!(%key, error = %e, "secondary provider failed, using primary fallbacks");
                RealtimeValues::default()
            }
        }
    }
}

/// Humidity for the current hour of the location's local day
///
/// The hourly series is in the location's timezone, so `now` is shifted by
/// the payload's UTC offset before matching on `YYYY-MM-DDTHH`.
fn current_humidity(forecast: &ForecastPayload, now: DateTime<Utc>) -> f64 {
    let local = now + Duration::seconds(forecast.utc_offset_seconds);
    let hour_prefix = local.format("%Y-%m-%dT%H").to_string();

    forecast
        .hourly
        .time
        .iter()
        .position(|time| time.starts_with(&hour_prefix))
        .and_then(|index| forecast.hourly.relative_humidity_2m.get(index).copied().flatten())
        .unwrap_or(0.0)
}

/// One forecast entry per provider day, in provider order
fn build_forecast(daily: &DailySeries) -> Vec<ForecastDay> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| ForecastDay {
            date: date.clone(),
            temperature: TemperatureRange {
                max: daily.temperature_2m_max[i],
                min: daily.temperature_2m_min[i],
            },
            condition: condition_label(daily.weathercode[i]).to_string(),
            rainfall: daily.precipitation_sum[i].unwrap_or(0.0),
        })
        .collect()
}
