//! # Wolt Checker Bot
//!
//! Interactive bot process. Also hosts the reopening notifier unless
//! `RUN_NOTIFIER=false`, in which case `wolt-notifier` runs it separately.
//! A small health server listens on `HTTP_PORT`.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wolt_checker_bot::bot::engine::ConversationEngine;
use wolt_checker_bot::bot::gateway::TelegramGateway;
use wolt_checker_bot::bot::handlers::BotHandler;
use wolt_checker_bot::bot::session::SessionStore;
use wolt_checker_bot::config::Config;
use wolt_checker_bot::database::connection::DatabaseManager;
use wolt_checker_bot::directory::WoltDirectory;
use wolt_checker_bot::services::health::HealthService;
use wolt_checker_bot::services::notifier::{Notifier, NotifierService};

const SESSION_SWEEP_EVERY: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wolt_checker_bot=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn open_store(config: &Config) -> Result<DatabaseManager> {
    let db = DatabaseManager::new(&config.database_url)
        .await
        .context("Failed to open the registrations database")?;
    db.run_migrations().await.context("Failed to migrate the database")?;
    Ok(db)
}

async fn start_notifier(notifier: Notifier, every: Duration) -> Result<NotifierService> {
    let mut service = NotifierService::new(notifier, every)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create notifier service: {}", e))?;
    service
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start notifier service: {}", e))?;
    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    info!(
        "Wolt Checker Bot v{} (database {}, health port {}, notifier {})",
        env!("CARGO_PKG_VERSION"),
        config.database_url,
        config.http_port,
        if config.run_notifier { "in-process" } else { "external" }
    );

    let db = open_store(&config).await?;

    let bot = Bot::new(&config.telegram_bot_token);
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let directory = Arc::new(WoltDirectory::new(&config.wolt_api_url, config.directory_timeout)?);

    let sessions = Arc::new(SessionStore::new(config.session_idle));
    let _sweeper = sessions.spawn_sweeper(SESSION_SWEEP_EVERY);

    let engine = Arc::new(ConversationEngine::new(
        gateway.clone(),
        directory.clone(),
        db.clone(),
        sessions,
        config.bot_languages.clone(),
    ));
    let handler = BotHandler::new(engine);

    let notifier = config.run_notifier.then(|| {
        Notifier::new(gateway, directory, db.clone(), config.notifier_languages.clone())
    });
    let mut notifier_service = match notifier.clone() {
        Some(notifier) => Some(start_notifier(notifier, config.poll_interval).await?),
        None => None,
    };

    let health = HealthService::new(Arc::new(db), notifier);
    let listener = TcpListener::bind(("0.0.0.0", config.http_port))
        .await
        .with_context(|| format!("Failed to bind health server to port {}", config.http_port))?;
    info!("Health endpoints on port {}", config.http_port);
    let health_task = tokio::spawn(async move { axum::serve(listener, health.router).await });

    let mut dispatcher = Dispatcher::builder(bot, handler.schema())
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Failed to handle a Telegram update",
        ))
        .enable_ctrlc_handler()
        .build();

    // The bot stops on Ctrl-C; the health server only stops on error.
    tokio::select! {
        _ = dispatcher.dispatch() => info!("Dispatcher stopped"),
        served = health_task => match served {
            Ok(Ok(())) => warn!("Health server exited"),
            Ok(Err(e)) => error!("Health server failed: {}", e),
            Err(e) => error!("Health server task panicked: {}", e),
        },
    }

    if let Some(service) = notifier_service.as_mut() {
        if let Err(e) = service.stop().await {
            warn!("Notifier did not shut down cleanly: {}", e);
        }
    }

    info!("Wolt Checker Bot stopped");
    Ok(())
}
