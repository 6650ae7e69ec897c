//! Stand-alone reopening notifier.
//!
//! Runs the polling notifier without the interactive bot, sharing the
//! database with a `wolt-checker-bot` started with `RUN_NOTIFIER=false`.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wolt_checker_bot::bot::gateway::TelegramGateway;
use wolt_checker_bot::config::Config;
use wolt_checker_bot::database::connection::DatabaseManager;
use wolt_checker_bot::directory::WoltDirectory;
use wolt_checker_bot::services::notifier::{Notifier, NotifierService};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wolt_checker_bot=info,wolt_notifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Wolt Checker notification service...");

    let db = DatabaseManager::new(&config.database_url).await?;
    db.run_migrations().await?;

    let notifier = Notifier::new(
        Arc::new(TelegramGateway::new(Bot::new(&config.telegram_bot_token))),
        Arc::new(WoltDirectory::new(&config.wolt_api_url, config.directory_timeout)?),
        db,
        config.notifier_languages.clone(),
    );

    let mut service = NotifierService::new(notifier, config.poll_interval)
        .await
        .map_err(|e| anyhow!("Failed to create notifier service: {}", e))?;
    service
        .start()
        .await
        .map_err(|e| anyhow!("Failed to start notifier service: {}", e))?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    if let Err(e) = service.stop().await {
        tracing::warn!("Error stopping notifier service: {}", e);
    }

    info!("Notifier stopped");
    Ok(())
}
