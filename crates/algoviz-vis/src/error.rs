//! Error types for algoviz-vis.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Result type for algoviz-vis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving or playing.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad environment or command-line configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Rejected algorithm request
    #[error(transparent)]
    Request(#[from] algoviz_core::Error),

    /// Player error
    #[error("Player error: {0}")]
    Player(#[from] algoviz_player::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Request(algoviz_core::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Request(_) | Error::Config(_) | Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::Io(_) | Error::Player(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
