//! Environment-driven configuration for the server and client tiers
//!
//! Every value has a default. Unparsable values are logged and replaced by
//! the default instead of aborting start-up.

use std::collections::HashMap;
use std::fmt::Display;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::data::open_meteo::OPEN_METEO_BASE_URL;
use crate::data::tomorrow::TOMORROW_BASE_URL;
use crate::proxy::chat::{DEFAULT_CHAT_MODEL, DEFAULT_CHAT_URL};
use crate::proxy::disease::DEFAULT_DISEASE_URL;

pub const DEFAULT_PORT: u16 = 5000;
pub const OPEN_METEO_TTL_SECS: i64 = 6;
pub const TOMORROW_TTL_SECS: i64 = 60;
pub const SOURCE_CACHE_CAPACITY: usize = 1024;
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 300;
pub const UPSTREAM_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const CLIENT_CACHE_TTL_SECS: i64 = 600;

/// Server tier settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Tomorrow.io key; `None` disables the secondary provider
    pub tomorrow_key: Option<String>,
    pub open_meteo_ttl: chrono::Duration,
    pub tomorrow_ttl: chrono::Duration,
    pub cache_capacity: NonZeroUsize,
    /// `None` disables the background sweeper
    pub sweep_interval: Option<Duration>,
    pub upstream_timeout: Duration,
    pub open_meteo_url: String,
    pub tomorrow_url: String,
    pub hf_token: Option<String>,
    pub chat_url: String,
    pub chat_model: String,
    pub disease_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = collect(pairs);

        let capacity = try_load(&env, "SOURCE_CACHE_CAPACITY", SOURCE_CACHE_CAPACITY);
        let sweep_secs = try_load(&env, "CACHE_SWEEP_INTERVAL_SECS", CACHE_SWEEP_INTERVAL_SECS);

        Self {
            bind_address: string_or(&env, "BIND_ADDRESS", "0.0.0.0"),
            port: try_load(&env, "PORT", DEFAULT_PORT),
            tomorrow_key: optional(&env, "TOMORROW_KEY"),
            open_meteo_ttl: chrono::Duration::seconds(try_load(
                &env,
                "OPEN_METEO_TTL_SECS",
                OPEN_METEO_TTL_SECS,
            )),
            tomorrow_ttl: chrono::Duration::seconds(try_load(
                &env,
                "TOMORROW_TTL_SECS",
                TOMORROW_TTL_SECS,
            )),
            cache_capacity: NonZeroUsize::new(capacity)
                .or_else(|| {
                    warn!("SOURCE_CACHE_CAPACITY must be positive, using {SOURCE_CACHE_CAPACITY}");
                    NonZeroUsize::new(SOURCE_CACHE_CAPACITY)
                })
                .unwrap_or(NonZeroUsize::MIN),
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            upstream_timeout: Duration::from_secs(try_load(
                &env,
                "UPSTREAM_TIMEOUT_SECS",
                UPSTREAM_TIMEOUT_SECS,
            )),
            open_meteo_url: string_or(&env, "OPEN_METEO_URL", OPEN_METEO_BASE_URL),
            tomorrow_url: string_or(&env, "TOMORROW_URL", TOMORROW_BASE_URL),
            hf_token: optional(&env, "HF_TOKEN"),
            chat_url: string_or(&env, "CHAT_URL", DEFAULT_CHAT_URL),
            chat_model: string_or(&env, "CHAT_MODEL", DEFAULT_CHAT_MODEL),
            disease_url: string_or(&env, "DISEASE_URL", DEFAULT_DISEASE_URL),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Client tier settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub cache_ttl: chrono::Duration,
    /// Overrides the XDG cache directory when set
    pub cache_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = collect(pairs);

        Self {
            server_url: string_or(&env, "WEATHER_SERVER_URL", DEFAULT_SERVER_URL),
            cache_ttl: chrono::Duration::seconds(try_load(
                &env,
                "WEATHER_CLIENT_TTL_SECS",
                CLIENT_CACHE_TTL_SECS,
            )),
            cache_dir: optional(&env, "WEATHER_CACHE_DIR").map(PathBuf::from),
        }
    }
}

fn collect<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Trimmed, non-empty value for `key`
fn optional(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn string_or(env: &HashMap<String, String>, key: &str, default: &str) -> String {
    optional(env, key).unwrap_or_else(|| default.to_string())
}

fn try_load<T>(env: &HashMap<String, String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = optional(env, key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_pairs(empty());

        assert_eq!(config.port, 5000);
        assert_eq!(config.address(), "0.0.0.0:5000");
        assert_eq!(config.tomorrow_key, None);
        assert_eq!(config.open_meteo_ttl, chrono::Duration::seconds(6));
        assert_eq!(config.tomorrow_ttl, chrono::Duration::seconds(60));
        assert_eq!(config.cache_capacity.get(), 1024);
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(300)));
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.open_meteo_url, OPEN_METEO_BASE_URL);
        assert_eq!(config.tomorrow_url, TOMORROW_BASE_URL);
    }

    #[test]
    fn test_server_overrides() {
        let config = ServerConfig::from_pairs(vec![
            ("PORT", "8080"),
            ("TOMORROW_KEY", " abc123 "),
            ("OPEN_METEO_TTL_SECS", "30"),
            ("TOMORROW_TTL_SECS", "120"),
            ("SOURCE_CACHE_CAPACITY", "64"),
            ("CACHE_SWEEP_INTERVAL_SECS", "0"),
            ("OPEN_METEO_URL", "http://127.0.0.1:9000/v1/forecast"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.tomorrow_key.as_deref(), Some("abc123"));
        assert_eq!(config.open_meteo_ttl, chrono::Duration::seconds(30));
        assert_eq!(config.tomorrow_ttl, chrono::Duration::seconds(120));
        assert_eq!(config.cache_capacity.get(), 64);
        assert_eq!(config.sweep_interval, None);
        assert_eq!(config.open_meteo_url, "http://127.0.0.1:9000/v1/forecast");
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = ServerConfig::from_pairs(vec![
            ("PORT", "not-a-port"),
            ("OPEN_METEO_TTL_SECS", "six"),
            ("SOURCE_CACHE_CAPACITY", "0"),
        ]);

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.open_meteo_ttl, chrono::Duration::seconds(OPEN_METEO_TTL_SECS));
        assert_eq!(config.cache_capacity.get(), SOURCE_CACHE_CAPACITY);
    }

    #[test]
    fn test_blank_tomorrow_key_disables_secondary() {
        let config = ServerConfig::from_pairs(vec![("TOMORROW_KEY", "   ")]);
        assert_eq!(config.tomorrow_key, None);
    }

    #[test]
    fn test_client_defaults_and_overrides() {
        let defaults = ClientConfig::from_pairs(empty());
        assert_eq!(defaults.server_url, DEFAULT_SERVER_URL);
        assert_eq!(defaults.cache_ttl, chrono::Duration::minutes(10));
        assert_eq!(defaults.cache_dir, None);

        let custom = ClientConfig::from_pairs(vec![
            ("WEATHER_SERVER_URL", "http://farm.local:5000"),
            ("WEATHER_CLIENT_TTL_SECS", "120"),
            ("WEATHER_CACHE_DIR", "/tmp/farmweather"),
        ]);
        assert_eq!(custom.server_url, "http://farm.local:5000");
        assert_eq!(custom.cache_ttl, chrono::Duration::minutes(2));
        assert_eq!(custom.cache_dir, Some(PathBuf::from("/tmp/farmweather")));
    }
}
