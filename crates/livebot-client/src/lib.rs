//! Client for the live-chat platform.
//!
//! This crate wraps the handful of platform actions the bot needs:
//! - OAuth token exchange (authorization code and refresh token)
//! - Bot creation and routing status
//! - Sending events to chats and transferring chats to human agents
//!
//! Calls go through a [`Transport`]; credentials come from a shared
//! [`AuthContext`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use livebot_client::{AuthContext, PlatformClient, PlatformEndpoints, ReqwestTransport};
//! use livebot_client::transport::DEFAULT_TIMEOUT;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = Arc::new(AuthContext::new());
//! let client = PlatformClient::new(
//!     Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT)?),
//!     PlatformEndpoints::default(),
//!     auth.clone(),
//! );
//! let tokens = client
//!     .exchange_auth_code("code", "client-id", "secret", "https://bot.example/install")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;

pub use auth::{AuthContext, AuthHeaders};
pub use client::PlatformClient;
pub use endpoints::{Endpoint, PlatformEndpoints};
pub use error::{ClientError, Result, TransportError};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportResponse};
