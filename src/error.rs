use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("Invalid FIT: {0}")]
    InvalidFit(String),
    #[error("No track found in file")]
    NoTrack,
    #[error("Track {track} has no segments")]
    EmptyTrack { track: usize },
    #[error("Segment {segment} has no points")]
    EmptySegment { segment: usize },
    #[error("Point {point} of segment {segment} has no timestamp")]
    MissingTimestamp { segment: usize, point: usize },
    #[error("Point {point} of segment {segment} has no elevation")]
    MissingElevation { segment: usize, point: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Weather request failed: {0}")]
    Transport(String),
    #[error("Weather service returned status {0}")]
    Status(u16),
    #[error("Invalid weather response: {0}")]
    InvalidResponse(String),
    #[error("Weather cache error: {0}")]
    Cache(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Table not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Parse(e) => AppError::Parse(e),
            PipelineError::Fetch(e) => AppError::Fetch(e),
            PipelineError::UnsupportedFormat(name) => {
                AppError::BadRequest(format!("Unsupported file format: {}", name))
            }
            other @ PipelineError::Io { .. } => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Parse(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
