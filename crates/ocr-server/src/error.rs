//! Error taxonomy, by kind rather than transport. The core pipeline itself
//! never returns a `Result` - it
//! reports emptiness via [`smart_crop_core::CropResult`]. This enum covers
//! everything around it: shared-memory transport, model loading,
//! configuration, and the recognizer/translator collaborators.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Shared-memory timeout or short read. Maps to an empty, successful
    /// response. The host will simply poll again next frame.
    #[error("transient input: {0}")]
    TransientInput(String),

    /// The textness network or OCR engine failed to initialize.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Unreadable or partially readable configuration. Never returned to a
    /// caller directly - logged as a warning and defaults are used instead,
    /// but kept in the taxonomy so callers of [`crate::config`] can match
    /// on it explicitly.
    #[error("config malformed: {0}")]
    ConfigMalformed(String),

    /// The OCR recognizer or translator collaborator failed.
    #[error("downstream failure: {0}")]
    Downstream(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::TransientInput(_) | ServerError::Downstream(_) => {
                (StatusCode::OK, String::new()).into_response()
            }
            ServerError::ModelUnavailable(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
            ServerError::ConfigMalformed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
