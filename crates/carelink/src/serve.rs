// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelink serve` command implementation.
//!
//! Wires the Telegram gateway, SQLite feedback store, SMTP notifier, and
//! dialogue engine together, starts the health endpoint, and runs the bot
//! loop until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use carelink_bot::{BotLoop, DialogueEngine, EngineOptions, shutdown};
use carelink_config::model::CarelinkConfig;
use carelink_core::error::CarelinkError;
use carelink_core::{ChatGateway, FeedbackStore, Notifier};
use carelink_notify::SmtpNotifier;
use carelink_store::SqliteFeedbackStore;
use carelink_telegram::TelegramGateway;
use tracing::{error, info, warn};

use crate::health;

/// Runs the `carelink serve` command.
pub async fn run_serve(config: CarelinkConfig) -> Result<(), CarelinkError> {
    init_tracing(&config.bot.log_level);

    info!("starting carelink serve");

    // Connect the store with bounded retry; exhaustion is fatal.
    let store = connect_store_with_retry(&config).await?;

    // The notifier is feature-disabled when credentials are incomplete.
    let notifier: Option<Arc<dyn Notifier>> = if SmtpNotifier::is_configured(&config.smtp) {
        let notifier = SmtpNotifier::new(config.smtp.clone(), config.bot.locale)?;
        info!(
            relay = config.smtp.host.as_str(),
            to = config.smtp.to_address.as_str(),
            "SMTP notifier enabled"
        );
        Some(Arc::new(notifier))
    } else {
        warn!("SMTP configuration incomplete, notifier disabled (records stay new)");
        None
    };

    // The Telegram token is the bot's identity; missing is fatal.
    let mut gateway = TelegramGateway::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram gateway");
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in carelink.toml \
             or the CARELINK_TELEGRAM_BOT_TOKEN environment variable."
        );
        e
    })?;
    gateway.connect().await?;
    let gateway: Arc<dyn ChatGateway> = Arc::new(gateway);

    let engine = Arc::new(DialogueEngine::new(
        store.clone() as Arc<dyn FeedbackStore>,
        notifier,
        EngineOptions::from_config(&config),
    ));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Liveness endpoint alongside the bot.
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .map_err(|e| {
            CarelinkError::Config(format!(
                "invalid server address {}:{}: {e}",
                config.server.bind_address, config.server.port
            ))
        })?;
    let health_cancel = cancel.clone();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health::serve(addr, health_cancel).await {
            error!(error = %e, "health server error");
        }
    });

    // Run the bot loop until shutdown.
    let mut bot_loop = BotLoop::new(gateway, engine, store, &config);
    bot_loop.run(cancel).await?;

    if let Err(e) = health_handle.await {
        warn!(error = %e, "health server task join error");
    }

    info!("carelink serve shutdown complete");
    Ok(())
}

/// Opens the store, retrying with a fixed backoff up to the configured
/// attempt cap. Every attempt uses a fresh adapter since a partially
/// initialized one cannot be reused.
async fn connect_store_with_retry(
    config: &CarelinkConfig,
) -> Result<Arc<SqliteFeedbackStore>, CarelinkError> {
    let max_attempts = config.startup.max_attempts;
    let delay = Duration::from_secs(config.startup.retry_delay_secs);

    let mut last_error = None;
    for attempt in 1..=max_attempts {
        let store = SqliteFeedbackStore::new(config.storage.clone());
        match store.initialize().await {
            Ok(()) => {
                info!(attempt, "feedback store connection established");
                return Ok(Arc::new(store));
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "failed to connect to feedback store"
                );
                last_error = Some(e);
                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        CarelinkError::Internal("store connection failed with no recorded error".into())
    }))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("carelink={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
