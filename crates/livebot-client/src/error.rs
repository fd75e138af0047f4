//! Error types for platform calls.

use thiserror::Error;

use crate::endpoints::Endpoint;

/// Failure to reach the platform at all.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The call did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// Target URL.
        url: String,
    },

    /// The connection could not be established (DNS, refused, reset).
    #[error("could not connect to {url}: {message}")]
    Connect {
        /// Target URL.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// Any other failure while sending the request or reading the response.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Target URL.
        url: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors returned by [`PlatformClient`](crate::PlatformClient) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or IO failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The platform answered with a non-2xx status.
    #[error("platform rejected {endpoint} request with status {status}: {body}")]
    Api {
        /// Endpoint that was called.
        endpoint: Endpoint,
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnosis.
        body: String,
    },

    /// A successful response had a body we could not decode.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        /// Endpoint that was called.
        endpoint: Endpoint,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// An authenticated call was attempted with no credentials in place.
    #[error("no credentials available for {0} request")]
    NotAuthenticated(Endpoint),

    /// Request payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status of an API rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the platform rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Result type for platform calls.
pub type Result<T> = std::result::Result<T, ClientError>;
