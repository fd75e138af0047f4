//! Bot logic for livebot.
//!
//! This crate holds the only parts of livebot with decisions or sequencing:
//! - [`InstallationManager`]: turns an OAuth code into a durable bot identity
//!   and restores that identity on every start
//! - [`ReplyEngine`]: picks what to send back for an incoming event
//! - [`WebhookRouter`]: decodes webhook deliveries and dispatches them
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use livebot_client::{PlatformEndpoints, ReqwestTransport};
//! use livebot_client::transport::DEFAULT_TIMEOUT;
//! use livebot_engine::{BotConfig, InstallationManager, ReplyEngine, WebhookRouter};
//! use livebot_persistence::{load_template, InstallationStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let installation = Arc::new(InstallationManager::new(
//!     Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT)?),
//!     PlatformEndpoints::default(),
//!     InstallationStore::new("/var/lib/livebot"),
//!     BotConfig::from_env()?,
//! ));
//! installation.restore().await?;
//!
//! let template = load_template("rich_message.json".as_ref())?;
//! let router = WebhookRouter::new(
//!     installation.clone(),
//!     ReplyEngine::new(installation.client(), template),
//! );
//! let outcome = router.handle(br#"{"action":"incoming_chat","payload":{"chat":{"id":"C1"}}}"#).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod installation;
pub mod reply;
pub mod router;

pub use config::BotConfig;
pub use error::{ConfigError, DecodeError, InstallError, ReplyError};
pub use installation::{InstallStatus, InstallationManager};
pub use reply::{PendingStep, ReplyEngine, ReplyOutcome, ScriptedReply};
pub use router::{RouteOutcome, WebhookRouter};
