//! livebot binary.
//!
//! Start the bot with:
//! ```bash
//! CLIENT_ID=xxx CLIENT_SECRET=xxx CLIENT_REDIRECT_URI=https://bot.example/install \
//!     cargo run -p livebot-server
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use livebot_client::ReqwestTransport;
use livebot_engine::{BotConfig, InstallationManager, ReplyEngine, WebhookRouter};
use livebot_persistence::{load_template, InstallationStore};
use livebot_server::{config, serve, AppState, ServerConfig, ServerError};
use tracing_subscriber::EnvFilter;

/// livebot - scripted chat bot answering platform webhooks
#[derive(Parser, Debug)]
#[command(name = "livebot")]
#[command(about = "Webhook bot for the live-chat platform: install callback and scripted replies")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "LIVEBOT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "LIVEBOT_PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Timeout for each platform API call, in seconds
    #[arg(long, env = "LIVEBOT_TIMEOUT_SECS", default_value = "10")]
    timeout_secs: u64,

    /// Directory holding the installation record (default: ~/.livebot)
    #[arg(long, env = "LIVEBOT_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Rich-message template sent when a chat opens (default: ./rich_message.json)
    #[arg(long, env = "LIVEBOT_TEMPLATE")]
    template: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Env files first so clap sees their values.
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let args = Args::parse();

    let filter = match args.verbose {
        0 => "livebot=info,tower_http=warn",
        1 => "livebot=debug,tower_http=info",
        2 => "livebot=trace,tower_http=debug",
        _ => "trace",
    };
    let env_filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        _ => EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let bot_config = BotConfig::from_env()?;
    let state_dir = args.state_dir.unwrap_or_else(config::state_dir);
    let template_path = args.template.unwrap_or_else(config::template_path);
    let template = load_template(&template_path)?;

    let server_config = ServerConfig::new(args.host, args.port)
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    let transport = ReqwestTransport::new(server_config.request_timeout)?;

    let installation = Arc::new(InstallationManager::new(
        Arc::new(transport),
        config::platform_endpoints(),
        InstallationStore::new(&state_dir),
        bot_config,
    ));

    match installation.restore().await {
        Ok(true) => {
            if let Some(bot_id) = installation.bot_id().await {
                tracing::info!(bot_id = %bot_id, "Restored installation");
            }
        }
        Ok(false) => tracing::info!("Not installed yet, open the install link to start"),
        Err(e) => tracing::warn!(error = %e, "Could not restore installation, reinstall required"),
    }

    let router = WebhookRouter::new(
        installation.clone(),
        ReplyEngine::new(installation.client(), template),
    );

    tracing::info!(
        state_dir = %state_dir.display(),
        template = %template_path.display(),
        "Starting livebot"
    );
    serve(AppState::new(server_config, installation, router)).await?;

    Ok(())
}
