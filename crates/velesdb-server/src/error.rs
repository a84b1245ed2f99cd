//! Maps [`velesdb_core::Error`] onto an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use velesdb_core::Error as CoreError;

/// Error body returned on every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable `VELES-0xx` code from the originating [`velesdb_core::Error`].
    pub code: &'static str,
    /// Human-readable message.
    pub error: String,
}

/// Wraps [`velesdb_core::Error`] so handlers can return it directly via `?`.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::AlreadyExists(_) => StatusCode::CONFLICT,
            CoreError::InvalidArgument(_) | CoreError::DimensionMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            CoreError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CoreError::Canceled => StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
            CoreError::IndexFull(_) => StatusCode::INSUFFICIENT_STORAGE,
            CoreError::Corruption(_) | CoreError::Io(_) | CoreError::Config(_)
            | CoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            code: self.0.code(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Shorthand for a handler result that turns any [`velesdb_core::Error`] into
/// an [`ApiError`] response.
pub type ApiResult<T> = Result<T, ApiError>;
