//! HTTP front end: `POST /images` with a multipart or JSON body.
//!
//! The handler only classifies the body and hands each image to the core
//! dispatcher; the first failing image ends the request with a 500.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::TryStreamExt;
use imgeater_core::{Dispatcher, IngestError, IngestionBatch, IngestionRequest, RawStream};
use serde::{Deserialize, Serialize};
use tokio_util::io::StreamReader;

/// Shared, read-only state for request handlers.
pub struct AppState {
    pub dispatcher: Dispatcher,
    /// Multipart field name that carries files
    pub files_field: String,
}

/// JSON request body.
#[derive(Debug, Default, Deserialize)]
pub struct JsonBody {
    #[serde(default)]
    pub base64: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Request failures mapped onto HTTP status codes.
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be interpreted at all
    BadRequest(String),
    /// An image failed to ingest
    Ingest(IngestError),
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(message) => {
                tracing::warn!("Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "bad_request".to_string(),
                        message,
                    },
                )
            }
            Self::Ingest(e) => {
                tracing::error!(error_type = e.kind(), "Ingestion failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: e.kind().to_string(),
                        message: e.to_string(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/images", post(load_images))
        // Uploads are streamed to disk, so the body size is not capped here
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// `POST /images`
async fn load_images(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<&'static str, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let stored = match media_type.as_str() {
        "multipart/form-data" => {
            tracing::debug!("Multipart upload");
            let multipart = Multipart::from_request(request, &state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            ingest_multipart(&state, multipart).await?
        }
        "application/json" => {
            tracing::debug!("JSON upload");
            let Json(body) = Json::<JsonBody>::from_request(request, &state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let batch = IngestionBatch {
                base64: body.base64,
                urls: body.urls,
                ..Default::default()
            };
            state.dispatcher.dispatch(batch).await?
        }
        _ => {
            return Err(ApiError::BadRequest(format!(
                "unsupported content type '{content_type}'"
            )))
        }
    };

    tracing::info!("Request stored {} image(s)", stored);
    Ok("ok")
}

/// Stream every file part named after the configured field into the
/// dispatcher, one at a time, as the body is read.
///
/// Parts without a filename (including the empty one browsers send for an
/// unused file input) are ignored. A body whose only files sit under other
/// field names is rejected.
async fn ingest_multipart(state: &AppState, mut multipart: Multipart) -> Result<usize, ApiError> {
    let mut stored = 0;
    let mut skipped = 0;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let Some(file_name) = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        if field.name() != Some(state.files_field.as_str()) {
            tracing::warn!(
                "Skipping file part {:?} in field {:?}, expected field {:?}",
                file_name,
                field.name(),
                state.files_field
            );
            skipped += 1;
            continue;
        }

        let reader = StreamReader::new(field.map_err(std::io::Error::other));
        let request = IngestionRequest::RawStream(RawStream::new(file_name, reader));
        state.dispatcher.ingest(request).await?;
        stored += 1;
    }

    if stored == 0 && skipped > 0 {
        return Err(ApiError::BadRequest(format!(
            "no file parts in field '{}'",
            state.files_field
        )));
    }
    Ok(stored)
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received terminate signal"),
    }

    tracing::info!("Shutting down gracefully...");
}
