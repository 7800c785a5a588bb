//! Client tier: the weather server round trip and the persisted result cache
//!
//! The last merged [`WeatherReport`] is kept in a single on-disk slot. While
//! it is fresh no location lookup or network call happens at all.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::cache::{CacheManager, CachedData};
use crate::data::{Coordinates, WeatherReport};
use crate::error::ClientError;
use crate::geo::Geolocator;

/// Name of the slot holding the last merged report
pub const RESULT_SLOT: &str = "weatherCache";

/// Calls `POST /weather` on the weather server
#[derive(Debug, Clone)]
pub struct WeatherServiceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl WeatherServiceClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherReport, ClientError> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({ "lat": coordinates.lat, "lon": coordinates.lon }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Single-slot cache of the last merged report
#[derive(Debug, Clone)]
pub struct ResultCache {
    store: CacheManager,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: CacheManager, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// The stored slot, fresh or not
    pub fn peek(&self) -> Option<CachedData<WeatherReport>> {
        self.store.read(RESULT_SLOT)
    }

    /// Return the cached report if fresh, otherwise locate and refresh
    pub async fn get_or_refresh<F, Fut>(
        &self,
        geolocator: &dyn Geolocator,
        refresh: F,
    ) -> Result<WeatherReport, ClientError>
    where
        F: FnOnce(Coordinates) -> Fut,
        Fut: Future<Output = Result<WeatherReport, ClientError>>,
    {
        self.get_or_refresh_at(Utc::now(), geolocator, refresh).await
    }

    /// [`get_or_refresh`](Self::get_or_refresh) evaluated at the instant `now`
    pub async fn get_or_refresh_at<F, Fut>(
        &self,
        now: DateTime<Utc>,
        geolocator: &dyn Geolocator,
        refresh: F,
    ) -> Result<WeatherReport, ClientError>
    where
        F: FnOnce(Coordinates) -> Fut,
        Fut: Future<Output = Result<WeatherReport, ClientError>>,
    {
        if let Some(cached) = self.peek() {
            if cached.is_fresh(now, self.ttl) {
                debug!(timestamp = %cached.timestamp, "using cached weather report");
                return Ok(cached.data);
            }
        }

        self.refresh_at(now, geolocator, refresh).await
    }

    /// Unconditionally locate, refresh and overwrite the slot
    ///
    /// On failure the existing slot is left as it was.
    pub async fn refresh_at<F, Fut>(
        &self,
        now: DateTime<Utc>,
        geolocator: &dyn Geolocator,
        refresh: F,
    ) -> Result<WeatherReport, ClientError>
    where
        F: FnOnce(Coordinates) -> Fut,
        Fut: Future<Output = Result<WeatherReport, ClientError>>,
    {
        let coordinates = geolocator.locate().await?;
        let report = refresh(coordinates).await?;

        if let Err(e) = self.store.write(RESULT_SLOT, &report, now) {
            warn!(error = %e, "failed to persist weather report");
        }

        Ok(report)
    }
}
