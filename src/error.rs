//! Error types shared across the server and client tiers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur when calling an upstream provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Response parsed but is structurally unusable
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Provider needs a credential that is not configured
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Errors surfaced by the `/weather` endpoint
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing lat/lon")]
    MissingCoordinates,

    #[error("Invalid lat/lon")]
    InvalidCoordinates,

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Failed to fetch weather data")]
    WeatherUnavailable(#[source] ProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingCoordinates
            | AppError::InvalidCoordinates
            | AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::WeatherUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors raised while obtaining weather on the client side
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not determine location: {0}")]
    Geolocation(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Weather server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Success status but the body is not a weather report
    #[error("Invalid weather server response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}
