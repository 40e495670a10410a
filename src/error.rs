use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use thiserror::Error;

/// Errors surfaced by request handlers.
///
/// The cause is logged, the client only sees a generic body.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("qr encoding error: {0}")]
    Qr(String),
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        match self {
            PortalError::MissingField(field) => {
                (StatusCode::BAD_REQUEST, format!("Missing field: {}", field)).into_response()
            }
            PortalError::Multipart(e) => {
                (StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e)).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
