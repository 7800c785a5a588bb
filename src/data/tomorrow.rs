//! Tomorrow.io realtime API client
//!
//! Supplies instantaneous precipitation intensity and UV index. The payload
//! is decoded leniently: any value the provider omits is simply absent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Coordinates, RealtimeSource};
use crate::error::ProviderError;

/// Base URL for the Tomorrow.io realtime endpoint
pub const TOMORROW_BASE_URL: &str = "https://api.tomorrow.io/v4/weather/realtime";

const PROVIDER: &str = "tomorrow.io";

/// Decoded realtime response (`{ data: { values: { ... } } }`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimePayload {
    #[serde(default)]
    pub data: Option<RealtimeData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeData {
    #[serde(default)]
    pub values: RealtimeValues,
}

/// The subset of realtime values the aggregator uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeValues {
    /// Precipitation intensity in mm/hr
    #[serde(default)]
    pub precipitation_intensity: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
}

impl RealtimePayload {
    pub fn values(&self) -> RealtimeValues {
        self.data
            .as_ref()
            .map(|data| data.values)
            .unwrap_or_default()
    }
}

/// Client for the Tomorrow.io realtime endpoint
///
/// Without an API key the client reports itself as unconfigured and every
/// fetch fails with [`ProviderError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct TomorrowClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TomorrowClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: TOMORROW_BASE_URL.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RealtimeSource for TomorrowClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_realtime(
        &self,
        coordinates: Coordinates,
    ) -> Result<RealtimePayload, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("TOMORROW_KEY"))?;

        let url = format!(
            "{}?location={},{}&apikey={}",
            self.base_url, coordinates.lat, coordinates.lon, api_key
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
