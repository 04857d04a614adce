use annotator_core::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Renders as `{ "error": "<message>" }`; clients get a status code and a
/// free-text message, nothing machine-readable beyond that.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `annotator_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request the server could not interpret.
    #[error("{0}")]
    BadRequest(String),

    /// Any other failure; the message is passed through to the client.
    #[error("{0}")]
    Unhandled(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(core) => match core {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Format(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                CoreError::NotLoaded => StatusCode::CONFLICT,
                CoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::debug!(%status, error = %message, "Request rejected");
        }

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
