//! HTTP transport seam.
//!
//! [`PlatformClient`](crate::PlatformClient) never talks to the network
//! directly; it hands fully built requests to a [`Transport`]. The production
//! implementation is [`ReqwestTransport`]; tests substitute a recording fake.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::error::TransportError;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A POST request ready to be sent.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Absolute URL, including any query string.
    pub url: String,
    /// Headers to attach.
    pub headers: Vec<(&'static str, String)>,
    /// Request body; `None` sends an empty body.
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    /// Creates a request without headers or body.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sets the headers.
    pub fn with_headers(mut self, headers: Vec<(&'static str, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends POST requests to the platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the status and body, whatever the status.
    ///
    /// Only failures to complete the exchange are errors.
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest` with a bounded timeout per call.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose calls expire after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        trace!(url = %request.url, "Sending platform request");

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(&request.url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(&request.url, e))?;

        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    let url = url.split('?').next().unwrap_or(url).to_string();
    if err.is_timeout() {
        TransportError::Timeout { url }
    } else if err.is_connect() {
        TransportError::Connect {
            url,
            message: err.to_string(),
        }
    } else {
        TransportError::Request {
            url,
            message: err.to_string(),
        }
    }
}
