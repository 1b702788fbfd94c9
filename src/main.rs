//! # Daily Poll Bot Main Entry Point
//!
//! Loads configuration, connects the store, then runs the vote listener and
//! one poll lifecycle side by side until the shutdown signal tears them down.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{info, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use daily_poll_bot::bot::client::{ChatClient, TelegramClient};
use daily_poll_bot::bot::handlers::BotHandler;
use daily_poll_bot::bot::listener::DispatcherListener;
use daily_poll_bot::config::Config;
use daily_poll_bot::database::store::connect_store;
use daily_poll_bot::poll::PollLifecycle;
use daily_poll_bot::services::health::HealthService;
use daily_poll_bot::services::runner::{watch_ctrl_c, Runner, RunningUnits};
use daily_poll_bot::services::shutdown::Shutdown;
use daily_poll_bot::services::vote_recorder::VoteRecorder;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daily_poll_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting Daily Poll Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Chat: {}, Poll: {} min with reminder {} min before close, {} options",
        config.chat_id,
        config.poll.duration_mins,
        config.poll.reminder_mins,
        config.poll.options.len()
    );

    // A taken port stops startup before the poll is posted
    let health_listener = HealthService::bind(config.http_port).await?;
    if let Some(port) = config.http_port {
        info!("Health check server starting on port {}", port);
    }

    let store = connect_store(&config).await;

    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let chat: Arc<dyn ChatClient> = Arc::new(TelegramClient::new(bot.clone(), config.chat_id));

    let shutdown = Shutdown::new();
    let lifecycle = PollLifecycle::new(
        chat.clone(),
        store.clone(),
        config.poll.clone(),
        config.image.clone(),
        shutdown.clone(),
    )?;
    let stage = lifecycle.stage_receiver();

    let recorder = Arc::new(VoteRecorder::new(
        store.clone(),
        config.poll.options.clone(),
        lifecycle.active_poll_receiver(),
    ));
    let listener = DispatcherListener::spawn(bot, BotHandler::new(recorder));
    info!("Telegram bot initialized successfully");

    let run_id = Uuid::new_v4();
    let lifecycle_task = tokio::spawn(lifecycle.run().instrument(tracing::info_span!("poll_run", %run_id)));

    let health_task = health_listener.map(|listener| {
        let health_service = HealthService::new(stage, store.clone());
        tokio::spawn(health_service.serve(listener, shutdown.clone()))
    });

    watch_ctrl_c(shutdown.clone());

    let runner = Runner::new(shutdown, config.shutdown_grace);
    let report = runner
        .supervise(RunningUnits {
            listener: Box::new(listener),
            lifecycle: lifecycle_task,
            chat,
            store,
            health: health_task,
        })
        .await;

    info!("Application stopped ({})", report.reason);
    if !report.is_success() {
        if let Some(error) = report.lifecycle.as_ref().and_then(|r| r.error.as_ref()) {
            tracing::error!("Poll lifecycle aborted: {}", error);
        }
        std::process::exit(1);
    }

    Ok(())
}
