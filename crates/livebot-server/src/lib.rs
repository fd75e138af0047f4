//! HTTP surface for livebot.
//!
//! Routes:
//! - `GET|POST /install?code=...`: OAuth install callback
//! - `POST /reply`: webhook deliveries from the platform
//! - `GET /health`: liveness and install status
//!
//! # Example
//!
//! ```ignore
//! use livebot_server::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(ServerConfig::default(), /* ... */);
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ServerConfig;
pub use error::{ApiError, Result, ServerError};
pub use router::{create_router, serve};
pub use state::AppState;
