//! Platform endpoint table.

/// Production OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.livechat.com/v2/token";

/// Production agent/configuration API base.
pub const DEFAULT_API_URL: &str = "https://api.livechatinc.com/v3.5";

/// A platform action this client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// OAuth token exchange.
    Token,
    /// Send an event to a chat.
    SendEvent,
    /// Change an agent's routing status.
    SetRoutingStatus,
    /// Hand a chat over to a human agent.
    TransferChat,
    /// Register a bot agent.
    CreateBot,
}

impl Endpoint {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Token => "token",
            Endpoint::SendEvent => "send_event",
            Endpoint::SetRoutingStatus => "set_routing_status",
            Endpoint::TransferChat => "transfer_chat",
            Endpoint::CreateBot => "create_bot",
        }
    }

    /// Path below the API base; `None` for the token endpoint.
    pub fn api_path(&self) -> Option<&'static str> {
        match self {
            Endpoint::Token => None,
            Endpoint::SendEvent => Some("/agent/action/send_event"),
            Endpoint::SetRoutingStatus => Some("/agent/action/set_routing_status"),
            Endpoint::TransferChat => Some("/agent/action/transfer_chat"),
            Endpoint::CreateBot => Some("/configuration/action/create_bot"),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the platform lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformEndpoints {
    token_url: String,
    api_url: String,
}

impl PlatformEndpoints {
    /// Creates an endpoint table from a token URL and an API base URL.
    pub fn new(token_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// API base URL, without trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL of an endpoint.
    pub fn url_for(&self, endpoint: Endpoint) -> String {
        match endpoint.api_path() {
            Some(path) => format!("{}{}", self.api_url, path),
            None => self.token_url.clone(),
        }
    }
}

impl Default for PlatformEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_URL, DEFAULT_API_URL)
    }
}
