//! farmweather - merged farm weather from the command line
//!
//! `farmweather serve` runs the aggregation server; `farmweather current`
//! prints the current report through the client-side result cache.

use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use farmweather::cache::CacheManager;
use farmweather::cli::{format_report, Cli, Command, CurrentArgs, CurrentOptions, ServeArgs};
use farmweather::client::{ResultCache, WeatherServiceClient};
use farmweather::config::{ClientConfig, ServerConfig};
use farmweather::data::Coordinates;
use farmweather::geo::{FixedGeolocator, Geolocator, IpGeolocator};
use farmweather::server::start_server;

/// Overall bound on one client round trip, covering the server's own upstream calls
const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Current(args) => current(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }

    start_server(config).await?;
    Ok(())
}

async fn current(args: CurrentArgs) -> Result<(), Box<dyn Error>> {
    // Validate before touching the cache or the network
    let options = CurrentOptions::from_args(&args)?;
    let config = ClientConfig::from_env();

    let store = match config.cache_dir {
        Some(dir) => CacheManager::with_dir(dir),
        None => CacheManager::new().ok_or("could not determine a cache directory")?,
    };
    let cache = ResultCache::new(store, config.cache_ttl);

    let http = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
    let server_url = options.server_url.clone().unwrap_or(config.server_url);
    let service = WeatherServiceClient::new(http.clone(), server_url);

    let geolocator: Box<dyn Geolocator> = match options.location {
        Some(coordinates) => Box::new(FixedGeolocator(coordinates)),
        None => Box::new(IpGeolocator::new(http)),
    };
    let refresh = |coordinates: Coordinates| {
        info!(lat = coordinates.lat, lon = coordinates.lon, "fetching weather");
        service.fetch(coordinates)
    };

    let report = if options.refresh {
        cache
            .refresh_at(Utc::now(), geolocator.as_ref(), refresh)
            .await?
    } else {
        cache.get_or_refresh(geolocator.as_ref(), refresh).await?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    Ok(())
}
