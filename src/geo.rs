//! Resolving the caller's current coordinates

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::data::Coordinates;
use crate::error::ClientError;

/// Free IP geolocation endpoint
pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Source of the caller's current location
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, ClientError>;
}

/// Always reports the same coordinates (e.g. from `--lat`/`--lon`)
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, ClientError> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximates the location from the caller's public IP address
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
}

impl IpGeolocator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: IP_LOOKUP_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, ClientError> {
        let lookup: IpLookup = self
            .client
            .get(&self.url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Geolocation(e.to_string()))?;

        if lookup.status != "success" {
            return Err(ClientError::Geolocation(
                lookup
                    .message
                    .unwrap_or_else(|| format!("lookup status {}", lookup.status)),
            ));
        }

        match (lookup.lat, lookup.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(ClientError::Geolocation(
                "lookup returned no coordinates".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn locator_for(body: serde_json::Value) -> (IpGeolocator, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        (IpGeolocator::new(Client::new()).with_url(server.uri()), server)
    }

    #[tokio::test]
    async fn test_fixed_geolocator_returns_its_coordinates() {
        let coords = Coordinates::new(18.52, 73.86);
        assert_eq!(FixedGeolocator(coords).locate().await.expect("locate"), coords);
    }

    #[tokio::test]
    async fn test_ip_lookup_success() {
        let (locator, _server) =
            locator_for(json!({ "status": "success", "lat": 18.52, "lon": 73.86 })).await;

        let coords = locator.locate().await.expect("locate");

        assert_eq!(coords, Coordinates::new(18.52, 73.86));
    }

    #[tokio::test]
    async fn test_ip_lookup_failure_is_geolocation_error() {
        let (locator, _server) =
            locator_for(json!({ "status": "fail", "message": "private range" })).await;

        let err = locator.locate().await.unwrap_err();

        assert!(matches!(err, ClientError::Geolocation(ref m) if m == "private range"));
    }
}
