//! Crop disease image-classification proxy
//!
//! Forwards uploaded image bytes to a hosted vision classifier and relays
//! its ranked labels.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ProviderError;

pub const DEFAULT_DISEASE_URL: &str =
    "https://router.huggingface.co/hf-inference/models/wambugu71/crop_leaf_diseases_vit";

/// One ranked classification label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    /// Placeholder result sent when no real prediction is available
    pub fn invalid() -> Vec<Prediction> {
        vec![Prediction {
            label: "Invalid".to_string(),
            score: 0.0,
        }]
    }
}

#[derive(Debug, Clone)]
pub struct DiseaseProxy {
    client: Client,
    url: String,
    token: Option<String>,
}

impl DiseaseProxy {
    pub fn new(client: Client, url: String, token: Option<String>) -> Self {
        Self { client, url, token }
    }

    /// Classify `image`, returning the classifier's ranked labels
    ///
    /// A response body that is not a prediction list yields
    /// [`Prediction::invalid`]; only transport failures are errors.
    pub async fn classify(&self, image: Vec<u8>) -> Result<Vec<Prediction>, ProviderError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let text = request.send().await?.text().await?;

        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(error = %e, "classifier returned an unexpected body");
            Prediction::invalid()
        }))
    }
}
