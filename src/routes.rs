use std::sync::Arc;

use axum::{
    extract::{multipart::Multipart, rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::data::{Coordinates, WeatherReport};
use crate::error::AppError;
use crate::proxy::chat::{ChatReply, ChatRequest, ERROR_REPLY};
use crate::proxy::Prediction;
use crate::state::AppState;

/// Multipart field carrying the leaf photo
const IMAGE_FIELD: &str = "image";

/// Body of `POST /weather`
#[derive(Debug, Deserialize)]
pub struct WeatherRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl WeatherRequest {
    pub fn coordinates(&self) -> Result<Coordinates, AppError> {
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Err(AppError::MissingCoordinates);
        };

        let coordinates = Coordinates::new(lat, lon);
        if !coordinates.is_valid() {
            return Err(AppError::InvalidCoordinates);
        }

        Ok(coordinates)
    }
}

pub async fn weather_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WeatherRequest>, JsonRejection>,
) -> Result<Json<WeatherReport>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected weather request body");
        AppError::MalformedPayload
    })?;
    let coordinates = request.coordinates()?;

    let report = state.aggregator.aggregate(coordinates).await.map_err(|e| {
        error!(key = %coordinates.key(), error = %e, "weather aggregation failed");
        AppError::WeatherUnavailable(e)
    })?;

    Ok(Json(report))
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let message = match payload {
        Ok(Json(ChatRequest {
            message: Some(message),
        })) if !message.trim().is_empty() => message,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatReply {
                    reply: "Message is required.".to_string(),
                }),
            )
                .into_response()
        }
    };

    match state.chat.complete(&message).await {
        Ok(reply) => Json(ChatReply { reply }).into_response(),
        Err(e) => {
            error!(error = %e, "chat completion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply {
                    reply: ERROR_REPLY.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn disease_handler(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let Some(image) = read_image(multipart).await else {
        return (StatusCode::BAD_REQUEST, Json(Prediction::invalid())).into_response();
    };

    match state.disease.classify(image).await {
        Ok(predictions) => Json(predictions).into_response(),
        Err(e) => {
            error!(error = %e, "disease classification failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Prediction::invalid())).into_response()
        }
    }
}

/// Bytes of the first non-empty `image` field, if any
async fn read_image(mut multipart: Multipart) -> Option<Vec<u8>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "malformed multipart upload");
                return None;
            }
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        return match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => Some(bytes.to_vec()),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "failed to read uploaded image");
                None
            }
        };
    }
}
