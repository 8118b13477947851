use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::response::ApiResponse;

/// Domain error taxonomy. NotFound and BadRequest carry their message to the
/// response envelope; everything else surfaces as a 500 with the cause logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            Error::NotFound(m) | Error::BadRequest(m) => m.clone(),
            Error::Database(e) => {
                tracing::error!("database error: {e}");
                "Internal server error".to_string()
            }
            Error::Other(e) => {
                tracing::error!("unexpected error: {e:#}");
                "Internal server error".to_string()
            }
        };
        ApiResponse::<()>::failure(self.status(), message).into_response()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
