//! Installation lifecycle.
//!
//! ```text
//! Uninstalled ──install──▶ Installing ──▶ Installed
//!      ▲                        │              │
//!      └──────── failure ◀──────┘              │ restart / 401
//!      ▲                                       ▼
//!      └──── refresh rejected ◀──── Installed (stale) ──refresh──▶ Installed (fresh)
//! ```
//!
//! The manager owns the live [`AuthContext`]. It is the only writer; the
//! [`PlatformClient`] handed out by [`InstallationManager::client`] only
//! reads it. Install and refresh are serialised on one lock; the status lock
//! is never held across a network call.

use std::sync::Arc;

use livebot_client::{AuthContext, AuthHeaders, PlatformClient, PlatformEndpoints, Transport};
use livebot_models::{InstallationRecord, RoutingStatus};
use livebot_persistence::InstallationStore;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::config::BotConfig;
use crate::error::InstallError;

/// Externally visible installation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    /// No usable installation.
    Uninstalled,
    /// First install is running.
    Installing,
    /// Bot is installed and credentials are loaded.
    Installed {
        /// Id of the installed bot.
        bot_id: String,
    },
}

#[derive(Debug, Default)]
struct State {
    record: Option<InstallationRecord>,
    installing: bool,
}

/// Drives install, restore and token refresh.
pub struct InstallationManager {
    client: PlatformClient,
    auth: Arc<AuthContext>,
    store: InstallationStore,
    config: BotConfig,
    state: RwLock<State>,
    op_lock: Mutex<()>,
}

impl InstallationManager {
    /// Creates an uninstalled manager with a fresh auth context.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: PlatformEndpoints,
        store: InstallationStore,
        config: BotConfig,
    ) -> Self {
        let auth = Arc::new(AuthContext::new());
        Self {
            client: PlatformClient::new(transport, endpoints, auth.clone()),
            auth,
            store,
            config,
            state: RwLock::new(State::default()),
            op_lock: Mutex::new(()),
        }
    }

    /// A client reading this manager's live credentials.
    pub fn client(&self) -> PlatformClient {
        self.client.clone()
    }

    /// Current credentials, if any.
    pub fn auth_snapshot(&self) -> Option<Arc<AuthHeaders>> {
        self.auth.snapshot()
    }

    /// Whether webhooks can be served.
    pub async fn is_installed(&self) -> bool {
        self.state.read().await.record.is_some()
    }

    /// Id of the installed bot.
    pub async fn bot_id(&self) -> Option<String> {
        self.state
            .read()
            .await
            .record
            .as_ref()
            .map(|r| r.bot_id.clone())
    }

    /// Current state.
    pub async fn status(&self) -> InstallStatus {
        let state = self.state.read().await;
        match (&state.record, state.installing) {
            (Some(record), _) => InstallStatus::Installed {
                bot_id: record.bot_id.clone(),
            },
            (None, true) => InstallStatus::Installing,
            (None, false) => InstallStatus::Uninstalled,
        }
    }

    /// Runs the full install sequence for an OAuth authorization code.
    ///
    /// Exchange the code, create the bot, enable chat routing, persist the
    /// record, then publish the new credentials. Nothing is persisted or
    /// published unless every step succeeds. Re-installing while installed
    /// creates a new bot and overwrites the record.
    #[instrument(skip_all)]
    pub async fn install(&self, auth_code: &str) -> Result<InstallationRecord, InstallError> {
        let _guard = self.op_lock.try_lock().map_err(|_| {
            warn!("Install requested while another install or refresh is running");
            InstallError::InProgress
        })?;

        self.state.write().await.installing = true;
        let result = self.run_install(auth_code).await;

        let mut state = self.state.write().await;
        state.installing = false;
        match result {
            Ok((record, headers)) => {
                self.auth.replace(headers);
                state.record = Some(record.clone());
                info!(bot_id = %record.bot_id, "Bot installed");
                Ok(record)
            }
            Err(e) => {
                error!(error = %e, "Installation failed");
                Err(e)
            }
        }
    }

    async fn run_install(
        &self,
        auth_code: &str,
    ) -> Result<(InstallationRecord, AuthHeaders), InstallError> {
        let tokens = self
            .client
            .exchange_auth_code(
                auth_code,
                &self.config.client_id,
                &self.config.client_secret,
                &self.config.redirect_uri,
            )
            .await
            .map_err(InstallError::Exchange)?;
        debug!(expires_in = ?tokens.expires_in, "Authorization code exchanged");

        // Credentials are staged on a private context until the sequence
        // completes; live readers keep using the previous ones meanwhile.
        let staged = Arc::new(AuthContext::with_headers(AuthHeaders::new(
            tokens.access_token.clone(),
        )));
        let client = self.client.with_auth(staged.clone());

        let bot_id = client
            .create_bot(&self.config.bot_name)
            .await
            .map_err(InstallError::CreateBot)?;
        let headers = AuthHeaders::new(tokens.access_token).with_author_id(bot_id.clone());
        staged.replace(headers.clone());

        client
            .set_routing_status(RoutingStatus::AcceptingChats, &bot_id)
            .await
            .map_err(InstallError::RoutingStatus)?;

        let record = InstallationRecord::new(tokens.refresh_token, bot_id);
        self.store.save(&record)?;
        Ok((record, headers))
    }

    /// Loads the persisted record, if any, and rehydrates from it.
    ///
    /// Returns `Ok(false)` when nothing was installed yet.
    pub async fn restore(&self) -> Result<bool, InstallError> {
        match self.store.load()? {
            Some(record) => {
                self.rehydrate(record).await?;
                Ok(true)
            }
            None => {
                info!(path = %self.store.path().display(), "No installation record found, waiting for install");
                Ok(false)
            }
        }
    }

    /// Exchanges the record's refresh token and loads the resulting credentials.
    ///
    /// On failure the record is treated as stale: credentials are cleared and
    /// the manager stays uninstalled until a fresh install.
    pub async fn rehydrate(&self, record: InstallationRecord) -> Result<(), InstallError> {
        let _guard = self.op_lock.lock().await;
        self.rehydrate_locked(record).await
    }

    /// Exchanges the current record's refresh token for a new access token.
    pub async fn refresh(&self) -> Result<(), InstallError> {
        self.refresh_after_rejection(None).await
    }

    /// Refreshes the access token after the platform rejected it.
    ///
    /// `rejected` is the snapshot the failing call used. If another task
    /// already replaced it, nothing is done.
    pub async fn refresh_after_rejection(
        &self,
        rejected: Option<Arc<AuthHeaders>>,
    ) -> Result<(), InstallError> {
        let _guard = self.op_lock.lock().await;

        if let (Some(rejected), Some(current)) = (rejected, self.auth.snapshot()) {
            if !Arc::ptr_eq(&rejected, &current) {
                debug!("Credentials already refreshed by another request");
                return Ok(());
            }
        }

        let record = self
            .state
            .read()
            .await
            .record
            .clone()
            .ok_or(InstallError::NotInstalled)?;
        self.rehydrate_locked(record).await
    }

    #[instrument(skip_all, fields(bot_id = %record.bot_id))]
    async fn rehydrate_locked(&self, record: InstallationRecord) -> Result<(), InstallError> {
        let tokens = match self
            .client
            .exchange_refresh_token(
                &record.refresh_token,
                &self.config.client_id,
                &self.config.client_secret,
            )
            .await
        {
            Ok(tokens) => tokens,
            Err(e) => {
                self.auth.clear();
                self.state.write().await.record = None;
                warn!(error = %e, "Stored installation is stale, a fresh install is required");
                return Err(InstallError::Refresh(e));
            }
        };

        self.auth
            .replace(AuthHeaders::new(tokens.access_token).with_author_id(record.bot_id.clone()));

        let record = if !tokens.refresh_token.is_empty()
            && tokens.refresh_token != record.refresh_token
        {
            let rotated = record.with_refresh_token(tokens.refresh_token);
            if let Err(e) = self.store.save(&rotated) {
                warn!(error = %e, "Failed to persist rotated refresh token");
            }
            rotated
        } else {
            record
        };

        self.state.write().await.record = Some(record);
        info!(expires_in = ?tokens.expires_in, "Access token refreshed");
        Ok(())
    }
}

impl std::fmt::Debug for InstallationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationManager")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livebot_client::testing::RecordingTransport;
    use livebot_client::{ClientError, Endpoint, TransportError};
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    const TOKEN_OK: &str = r#"{"access_token":"at-1","refresh_token":"rt-1","expires_in":28800}"#;

    struct Fixture {
        _dir: TempDir,
        transport: Arc<RecordingTransport>,
        store: InstallationStore,
        manager: InstallationManager,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let store = InstallationStore::new(dir.path());
        let manager = InstallationManager::new(
            transport.clone(),
            PlatformEndpoints::new("http://sso/v2/token", "http://api/v3.5"),
            store.clone(),
            BotConfig::new("cid", "secret", "http://localhost/install"),
        );
        Fixture {
            _dir: dir,
            transport,
            store,
            manager,
        }
    }

    #[tokio::test]
    async fn test_install_happy_path() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.transport
            .respond("/configuration/action/create_bot", 200, r#"{"id":"bot-7"}"#);

        let record = f.manager.install("code-1").await.unwrap();

        assert_eq!(record.bot_id, "bot-7");
        assert_eq!(record.refresh_token, "rt-1");
        assert_eq!(
            f.manager.status().await,
            InstallStatus::Installed {
                bot_id: "bot-7".into()
            }
        );

        let stored = f.store.load().unwrap().unwrap();
        assert_eq!(stored.bot_id, "bot-7");
        assert_eq!(stored.refresh_token, "rt-1");

        assert_eq!(
            f.transport.call_sequence(),
            vec!["token", "create_bot", "set_routing_status"]
        );

        let routing = f.transport.requests_to(Endpoint::SetRoutingStatus).remove(0);
        assert_eq!(
            routing.json_body(),
            json!({"status": "accepting_chats", "agent_id": "bot-7"})
        );
        assert_eq!(routing.header("Authorization"), Some("Bearer at-1"));
        assert_eq!(routing.header("X-Author-Id"), Some("bot-7"));

        let create = f.transport.requests_to(Endpoint::CreateBot).remove(0);
        assert_eq!(create.header("Authorization"), Some("Bearer at-1"));
        assert_eq!(create.json_body(), json!({"name": "ChatBot"}));

        let live = f.manager.auth_snapshot().unwrap();
        assert_eq!(live.authorization(), "Bearer at-1");
        assert_eq!(live.author_id(), Some("bot-7"));
    }

    #[tokio::test]
    async fn test_install_exchange_failure_stays_uninstalled() {
        let f = fixture();
        f.transport
            .respond("/token", 400, r#"{"error":"invalid_grant"}"#);

        let err = f.manager.install("used-code").await.unwrap_err();

        assert!(matches!(err, InstallError::Exchange(ClientError::Api { status: 400, .. })));
        assert_eq!(f.manager.status().await, InstallStatus::Uninstalled);
        assert!(f.store.load().unwrap().is_none());
        assert!(f.manager.auth_snapshot().is_none());
        assert_eq!(f.transport.call_sequence(), vec!["token"]);
    }

    #[tokio::test]
    async fn test_install_create_bot_failure_writes_nothing() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.transport
            .respond("/configuration/action/create_bot", 403, "forbidden");

        let err = f.manager.install("code").await.unwrap_err();

        assert!(matches!(err, InstallError::CreateBot(_)));
        assert!(!f.manager.is_installed().await);
        assert!(f.store.load().unwrap().is_none());
        assert!(f.manager.auth_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_install_routing_failure_writes_nothing() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.transport
            .respond("/configuration/action/create_bot", 200, r#"{"id":"bot-7"}"#);
        f.transport.fail(
            "/agent/action/set_routing_status",
            TransportError::Timeout {
                url: "http://api".into(),
            },
        );

        let err = f.manager.install("code").await.unwrap_err();

        assert!(matches!(
            err,
            InstallError::RoutingStatus(ClientError::Transport(TransportError::Timeout { .. }))
        ));
        assert_eq!(f.manager.status().await, InstallStatus::Uninstalled);
        assert!(f.store.load().unwrap().is_none());
        assert!(f.manager.auth_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_reinstall_overwrites_record() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.transport
            .respond_once("/configuration/action/create_bot", 200, r#"{"id":"bot-1"}"#);
        f.manager.install("code-1").await.unwrap();

        f.transport.respond(
            "/token",
            200,
            r#"{"access_token":"at-2","refresh_token":"rt-2"}"#,
        );
        f.transport
            .respond("/configuration/action/create_bot", 200, r#"{"id":"bot-2"}"#);
        let record = f.manager.install("code-2").await.unwrap();

        assert_eq!(record.bot_id, "bot-2");
        assert_eq!(f.store.load().unwrap().unwrap().bot_id, "bot-2");
        assert_eq!(f.manager.bot_id().await.as_deref(), Some("bot-2"));
        assert_eq!(f.manager.auth_snapshot().unwrap().authorization(), "Bearer at-2");
    }

    #[tokio::test]
    async fn test_failed_reinstall_keeps_previous_install() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.transport
            .respond("/configuration/action/create_bot", 200, r#"{"id":"bot-1"}"#);
        f.manager.install("code-1").await.unwrap();

        f.transport
            .respond("/configuration/action/create_bot", 500, "boom");
        f.manager.install("code-2").await.unwrap_err();

        assert_eq!(f.manager.bot_id().await.as_deref(), Some("bot-1"));
        assert_eq!(f.store.load().unwrap().unwrap().bot_id, "bot-1");
        assert_eq!(f.manager.auth_snapshot().unwrap().author_id(), Some("bot-1"));
    }

    #[tokio::test]
    async fn test_rehydrate_success() {
        let f = fixture();
        f.transport
            .respond("/token", 200, r#"{"access_token":"fresh","refresh_token":"rt-0"}"#);

        f.manager
            .rehydrate(InstallationRecord::new("rt-0", "bot-3"))
            .await
            .unwrap();

        assert!(f.manager.is_installed().await);
        let live = f.manager.auth_snapshot().unwrap();
        assert_eq!(live.authorization(), "Bearer fresh");
        assert_eq!(live.author_id(), Some("bot-3"));

        let url = &f.transport.requests()[0].url;
        assert!(url.contains("grant_type=refresh_token"));
        assert!(url.contains("refresh_token=rt-0"));
        // Unchanged refresh token: nothing rewritten.
        assert!(f.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rehydrate_persists_rotated_refresh_token() {
        let f = fixture();
        f.transport
            .respond("/token", 200, r#"{"access_token":"fresh","refresh_token":"rt-new"}"#);

        f.manager
            .rehydrate(InstallationRecord::new("rt-old", "bot-3"))
            .await
            .unwrap();

        let stored = f.store.load().unwrap().unwrap();
        assert_eq!(stored.refresh_token, "rt-new");
        assert_eq!(stored.bot_id, "bot-3");
    }

    #[tokio::test]
    async fn test_rehydrate_rejected_token_is_stale() {
        let f = fixture();
        f.transport
            .respond("/token", 401, r#"{"error":"invalid_grant"}"#);

        let err = f
            .manager
            .rehydrate(InstallationRecord::new("revoked", "bot-3"))
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Refresh(_)));
        assert_eq!(f.manager.status().await, InstallStatus::Uninstalled);
        assert!(f.manager.auth_snapshot().is_none());

        // Without credentials no agent call can reach the platform.
        let event = livebot_models::MessageEvent::text("hi").to_raw().unwrap();
        let err = f.manager.client().send_event("C1", &event).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated(_)));
        assert!(f.transport.requests_to(Endpoint::SendEvent).is_empty());
        assert!(f.transport.requests_to(Endpoint::TransferChat).is_empty());
    }

    #[tokio::test]
    async fn test_restore_without_record() {
        let f = fixture();
        assert!(!f.manager.restore().await.unwrap());
        assert!(f.transport.requests().is_empty());
        assert_eq!(f.manager.status().await, InstallStatus::Uninstalled);
    }

    #[tokio::test]
    async fn test_restore_with_record() {
        let f = fixture();
        f.store.save(&InstallationRecord::new("rt-1", "bot-9")).unwrap();
        f.transport.respond("/token", 200, TOKEN_OK);

        assert!(f.manager.restore().await.unwrap());
        assert_eq!(f.manager.bot_id().await.as_deref(), Some("bot-9"));
    }

    #[tokio::test]
    async fn test_refresh_after_rejection_skips_when_already_replaced() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.manager
            .rehydrate(InstallationRecord::new("rt-1", "bot-1"))
            .await
            .unwrap();
        let stale = f.manager.auth_snapshot();

        f.manager.refresh_after_rejection(stale.clone()).await.unwrap();
        assert_eq!(f.transport.requests_to(Endpoint::Token).len(), 2);

        // The snapshot was replaced by the refresh above.
        f.manager.refresh_after_rejection(stale).await.unwrap();
        assert_eq!(f.transport.requests_to(Endpoint::Token).len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_access_token() {
        let f = fixture();
        f.transport.respond("/token", 200, TOKEN_OK);
        f.manager
            .rehydrate(InstallationRecord::new("rt-1", "bot-1"))
            .await
            .unwrap();
        f.transport
            .respond("/token", 200, r#"{"access_token":"at-2","refresh_token":"rt-1"}"#);

        f.manager.refresh().await.unwrap();

        assert_eq!(f.transport.requests_to(Endpoint::Token).len(), 2);
        let live = f.manager.auth_snapshot().unwrap();
        assert_eq!(live.authorization(), "Bearer at-2");
        assert_eq!(live.author_id(), Some("bot-1"));
        assert!(f.manager.is_installed().await);
    }

    #[tokio::test]
    async fn test_refresh_when_not_installed() {
        let f = fixture();
        let err = f.manager.refresh().await.unwrap_err();
        assert!(matches!(err, InstallError::NotInstalled));
        let err = f.manager.refresh_after_rejection(None).await.unwrap_err();
        assert!(matches!(err, InstallError::NotInstalled));
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_install_is_rejected() {
        let f = fixture();
        let _held = f.manager.op_lock.lock().await;

        let err = f.manager.install("code").await.unwrap_err();
        assert!(matches!(err, InstallError::InProgress));
        assert!(f.transport.requests().is_empty());
    }
}
