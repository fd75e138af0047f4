//! Core data models for livebot.
//!
//! This crate provides the data types shared by every livebot crate: the
//! OAuth token payloads, the persisted installation record, inbound webhook
//! envelopes and the outbound events the bot sends back to visitors.

pub mod events;
pub mod installation;
pub mod webhook;

pub use events::{MessageEvent, RichMessageTemplate, RoutingStatus};
pub use installation::{InstallationRecord, TokenDetails};
pub use webhook::{
    Chat, IncomingChatEvent, IncomingChatOpened, Postback, RichMessageEvent, WebhookAction,
    WebhookEnvelope,
};
