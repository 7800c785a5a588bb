//! HTTP server for the weather endpoint and the inference proxies

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::post,
    Router,
};
use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{signal, SignalKind};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::routes::{chat_handler, disease_handler, weather_handler};
use crate::state::AppState;
use crate::sweep::SweepHandle;

/// Largest accepted leaf photo upload
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the application router over `state`
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/weather", post(weather_handler))
        .route("/chat", post(chat_handler))
        .route(
            "/disease",
            post(disease_handler).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .layer(cors)
        .with_state(state)
}

/// Runs the server on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let sweeper = state
        .config
        .sweep_interval
        .map(|interval| SweepHandle::spawn(state.aggregator.clone(), interval));

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await;

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }

    result
}

pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing state...");
    let address = config.address();
    let state = AppState::new(config)?;

    if state.config.tomorrow_key.is_none() {
        info!("TOMORROW_KEY not set, rainfall and UV fall back to Open-Meteo values");
    }

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    serve(listener, state, shutdown_signal()).await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
