use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned by the API handlers.
///
/// Responses carry only a status code, like the real server does for
/// malformed requests.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request parameters.
    #[error("Bad request: {0}")]
    BadRequest(&'static str),

    /// No valid bearer token.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Failure while building the response.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(reason) => {
                tracing::debug!(reason, "Rejected request");
                StatusCode::BAD_REQUEST.into_response()
            }
            Self::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            Self::Internal(_) => {
                tracing::error!(error = %self, "API internal error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(e: crate::error::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
