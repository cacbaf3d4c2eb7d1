// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scory Bot webhook server
//!
//! Receives Telegram updates, runs score-tracking commands against the
//! activity store and replies in the originating chat.

use anyhow::Context;
use scory_bot::{
    bot::CommandKind,
    config::{Config, StoreBackend},
    db::{ActivityStore, FirestoreDb, MemoryStore},
    services::telegram::{BotCommand, TelegramClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, backend = ?config.store_backend, "Starting Scory Bot");

    // Initialize the activity store
    let store: Arc<dyn ActivityStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(
            FirestoreDb::new(&config.gcp_project_id)
                .await
                .context("Failed to connect to Firestore")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store));

    register_bot(&state.telegram, &config).await;

    // Build router
    let app = scory_bot::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Publish the command menu and, with a public URL, point the webhook here.
///
/// Failures are logged; the server still starts so an existing webhook keeps
/// working.
async fn register_bot(telegram: &TelegramClient, config: &Config) {
    let commands: Vec<BotCommand> = CommandKind::ALL
        .iter()
        .map(|kind| BotCommand {
            command: kind.name().to_string(),
            description: kind.description().to_string(),
        })
        .collect();

    match telegram.set_my_commands(&commands).await {
        Ok(()) => tracing::info!(count = commands.len(), "Bot commands registered"),
        Err(e) => tracing::error!(error = %e, "Failed to register bot commands"),
    }

    let Some(url) = config.webhook_url() else {
        tracing::info!("PUBLIC_URL not set; skipping webhook registration");
        return;
    };

    match telegram
        .set_webhook(&url, &config.webhook_secret_token)
        .await
    {
        Ok(()) => tracing::info!("Webhook registered"),
        Err(e) => tracing::error!(error = %e, "Failed to register webhook"),
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scory_bot=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
