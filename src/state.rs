use std::sync::Arc;

use reqwest::Client;

use crate::aggregator::Aggregator;
use crate::cache::SourceCache;
use crate::config::ServerConfig;
use crate::data::{OpenMeteoClient, TomorrowClient};
use crate::proxy::{ChatProxy, DiseaseProxy};

/// Shared server state, built once at start-up
pub struct AppState {
    pub config: ServerConfig,
    pub aggregator: Arc<Aggregator>,
    pub chat: ChatProxy,
    pub disease: DiseaseProxy,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, reqwest::Error> {
        let http = Client::builder().timeout(config.upstream_timeout).build()?;

        let primary = OpenMeteoClient::new(http.clone()).with_base_url(&config.open_meteo_url);
        let secondary = TomorrowClient::new(http.clone(), config.tomorrow_key.clone())
            .with_base_url(&config.tomorrow_url);

        let aggregator = Aggregator::new(
            Arc::new(primary),
            Arc::new(secondary),
            SourceCache::new("open-meteo", config.open_meteo_ttl, config.cache_capacity),
            SourceCache::new("tomorrow.io", config.tomorrow_ttl, config.cache_capacity),
        );

        let chat = ChatProxy::new(
            http.clone(),
            config.chat_url.clone(),
            config.chat_model.clone(),
            config.hf_token.clone(),
        );
        let disease = DiseaseProxy::new(http, config.disease_url.clone(), config.hf_token.clone());

        Ok(Arc::new(Self {
            config,
            aggregator: Arc::new(aggregator),
            chat,
            disease,
        }))
    }
}
