//! Fellowship Bot - church assistant for Telegram
//!
//! A per-user session state machine that records prayer requests,
//! counseling requests, testimonies and registrations, answers questions
//! through a hosted language model, and gives one administrator a dashboard,
//! broadcasts and data export.

mod admin;
mod config;
mod db;
mod export;
mod llm;
mod menu;
mod responder;
mod runtime;
mod state_machine;
mod system_prompt;
mod telegram;

use admin::AdminGate;
use config::Config;
use db::Database;
use llm::{LlmService, LoggingService, OpenAiCompatService};
use responder::LlmResponder;
use runtime::{DatabaseStore, Dispatcher, ProductionRouter, SessionRouter, SessionStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle sessions are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fellowship_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };
    tracing::info!(config = ?config, "Configuration loaded");

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent().filter(|p| *p != Path::new("")) {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    let counts = db.count_all()?;
    tracing::info!(
        members = counts.members,
        prayers = counts.prayers,
        counsel = counts.counsel,
        testimonies = counts.testimonies,
        "Database ready"
    );

    let backend = OpenAiCompatService::new(
        &config.hf_api_key,
        &config.llm_model,
        &config.llm_base_url,
        config.llm_timeout,
    )?;
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(backend)));
    tracing::info!(model = %service.model_id(), "LLM service initialized");

    let responder = Arc::new(LlmResponder::new(
        service,
        system_prompt::build_system_prompt(),
        config.llm_timeout,
    ));
    let client = Arc::new(TelegramClient::new(&config.bot_token)?);
    let sessions = Arc::new(SessionStore::new());

    let dispatcher = Dispatcher::new(
        DatabaseStore::new(db),
        responder,
        client.clone(),
        AdminGate::new(config.admin_id),
        sessions.clone(),
    );
    let router: ProductionRouter = SessionRouter::new(dispatcher, config.session_idle);

    let cancel = CancellationToken::new();
    let sweeper = runtime::spawn_session_sweeper(
        sessions,
        config.session_idle,
        SWEEP_INTERVAL,
        cancel.clone(),
    );

    // Ctrl-C stops polling; queued messages drain before exit
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    tracing::info!(admin = %config.admin_id, "Bot is running");
    telegram::run_polling(&client, &router, cancel).await;
    router.shutdown().await;

    sweeper.await?;
    tracing::info!("Bot stopped");
    Ok(())
}
