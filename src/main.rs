//! # Reminder Broadcast Bot Main Entry Point
//!
//! Wires together logging, configuration, the persistence store, the
//! delivery scheduler, the health server, and the Telegram dispatcher.

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod database;
mod services;
mod utils;

use crate::bot::handlers;
use crate::bot::AppContext;
use crate::config::Config;
use crate::database::Store;
use crate::services::broadcast::{Broadcaster, TelegramMessenger};
use crate::services::health::HealthService;
use crate::services::scheduler::ReminderScheduler;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reminder_broadcast_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!(
        "Starting Reminder Broadcast Bot v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Admin: {}",
        config.database_url, config.http_port, config.admin_id
    );

    // Initialize storage
    info!("Initializing database connection...");
    let store = Store::connect(&config.database_url).await?;
    store.run_migrations().await?;
    info!("Database initialized successfully");

    // Initialize bot and delivery pipeline
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let broadcaster = Broadcaster::new(store.clone(), messenger);

    let mut scheduler = match ReminderScheduler::new(store.clone(), broadcaster).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to create reminder scheduler: {}", e);
            return Err(anyhow::anyhow!("Failed to create reminder scheduler: {}", e));
        }
    };

    // The catch-up pass for missed reminders runs inside start()
    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start reminder scheduler: {}", e);
    } else {
        info!("Reminder scheduler started successfully");
    }

    // Initialize health service
    let health_service = HealthService::new(store.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    let ctx = Arc::new(AppContext::new(config, store));

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handlers::schema())
            .dependencies(dptree::deps![ctx])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        bot_result = bot_task => {
            if let Err(e) = bot_result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        health_result = health_task => {
            if let Err(e) = health_result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    // Stop the scheduler on shutdown
    if let Err(e) = scheduler.stop().await {
        tracing::warn!("Error stopping reminder scheduler: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
