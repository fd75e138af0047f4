//! Server error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use livebot_client::TransportError;
use livebot_engine::{ConfigError, InstallError};
use livebot_persistence::PersistenceError;
use thiserror::Error;

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error answered to an HTTP caller.
///
/// Responses are plain text; the platform never gets structured errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Installation could not be completed.
    #[error("installation failed: {0}")]
    Install(#[from] InstallError),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Install(InstallError::InProgress) => StatusCode::CONFLICT,
            ApiError::Install(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Startup failure of the `livebot` binary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load template: {0}")]
    Template(#[from] PersistenceError),

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] TransportError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Install(InstallError::InProgress).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Install(InstallError::NotInstalled).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::BadRequest("missing code".into());
        assert_eq!(err.to_string(), "bad request: missing code");
    }
}
