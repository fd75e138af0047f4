//! Typed client for the platform's OAuth and agent APIs.
//!
//! Every method performs exactly one outbound call and never retries.
//! Credentials are read from the shared [`AuthContext`] but never written
//! here; keeping them current is the installation manager's job.

use std::sync::Arc;

use livebot_models::{RoutingStatus, TokenDetails};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::{debug, warn};
use url::Url;

use crate::auth::AuthContext;
use crate::endpoints::{Endpoint, PlatformEndpoints};
use crate::error::{ClientError, Result};
use crate::transport::{OutboundRequest, Transport};

#[derive(Serialize)]
struct SendEventRequest<'a> {
    chat_id: &'a str,
    event: &'a RawValue,
}

#[derive(Serialize)]
struct CreateBotRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct CreateBotResponse {
    id: String,
}

#[derive(Serialize)]
struct SetRoutingStatusRequest<'a> {
    status: RoutingStatus,
    agent_id: &'a str,
}

#[derive(Serialize)]
struct TransferChatRequest<'a> {
    id: &'a str,
}

/// Client for the live-chat platform.
///
/// Cheap to clone; clones share the transport and auth context.
#[derive(Clone)]
pub struct PlatformClient {
    transport: Arc<dyn Transport>,
    endpoints: Arc<PlatformEndpoints>,
    auth: Arc<AuthContext>,
}

impl PlatformClient {
    /// Creates a client reading credentials from `auth`.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: PlatformEndpoints,
        auth: Arc<AuthContext>,
    ) -> Self {
        Self {
            transport,
            endpoints: Arc::new(endpoints),
            auth,
        }
    }

    /// Returns a client sharing this one's transport but reading another
    /// auth context.
    pub fn with_auth(&self, auth: Arc<AuthContext>) -> Self {
        Self {
            transport: self.transport.clone(),
            endpoints: self.endpoints.clone(),
            auth,
        }
    }

    /// The auth context this client reads.
    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// Exchanges a single-use OAuth authorization code for tokens.
    pub async fn exchange_auth_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TokenDetails> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenDetails> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    /// Registers a bot agent and returns its id.
    pub async fn create_bot(&self, name: &str) -> Result<String> {
        let body = self
            .authenticated_post(Endpoint::CreateBot, &CreateBotRequest { name })
            .await?;
        let response: CreateBotResponse = decode(Endpoint::CreateBot, &body)?;
        debug!(bot_id = %response.id, "Bot created");
        Ok(response.id)
    }

    /// Sets the routing status of an agent.
    pub async fn set_routing_status(&self, status: RoutingStatus, agent_id: &str) -> Result<()> {
        self.authenticated_post(
            Endpoint::SetRoutingStatus,
            &SetRoutingStatusRequest { status, agent_id },
        )
        .await?;
        debug!(agent_id, %status, "Routing status set");
        Ok(())
    }

    /// Transfers a chat to a human agent.
    pub async fn transfer_chat(&self, chat_id: &str) -> Result<()> {
        self.authenticated_post(Endpoint::TransferChat, &TransferChatRequest { id: chat_id })
            .await?;
        debug!(chat_id, "Chat transferred");
        Ok(())
    }

    /// Sends a pre-serialized event to a chat, forwarding it verbatim.
    pub async fn send_event(&self, chat_id: &str, event: &RawValue) -> Result<()> {
        self.authenticated_post(Endpoint::SendEvent, &SendEventRequest { chat_id, event })
            .await?;
        debug!(chat_id, "Event sent");
        Ok(())
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenDetails> {
        let url = Url::parse_with_params(self.endpoints.token_url(), params)?;
        let body = self
            .dispatch(Endpoint::Token, OutboundRequest::new(url.as_str()))
            .await?;
        decode(Endpoint::Token, &body)
    }

    async fn authenticated_post<T: Serialize>(
        &self,
        endpoint: Endpoint,
        payload: &T,
    ) -> Result<Vec<u8>> {
        let headers = self
            .auth
            .snapshot()
            .ok_or(ClientError::NotAuthenticated(endpoint))?;
        let body = serde_json::to_vec(payload)?;
        let request = OutboundRequest::new(self.endpoints.url_for(endpoint))
            .with_headers(headers.to_header_list())
            .with_body(body);
        self.dispatch(endpoint, request).await
    }

    async fn dispatch(&self, endpoint: Endpoint, request: OutboundRequest) -> Result<Vec<u8>> {
        let response = self.transport.post(request).await?;
        if !response.is_success() {
            let body = response.body_text();
            warn!(%endpoint, status = response.status, body = %body, "Platform rejected request");
            return Err(ClientError::Api {
                endpoint,
                status: response.status,
                body,
            });
        }
        Ok(response.body)
    }
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("endpoints", &self.endpoints)
            .field("authenticated", &self.auth.is_authenticated())
            .finish()
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode { endpoint, source })
}
