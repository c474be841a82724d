// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue engine and orchestrator loop for the Carelink feedback bot.
//!
//! The [`BotLoop`] is the central coordinator that:
//! - Receives events from the chat gateway
//! - Spawns one tracked task per event into the dialogue engine
//! - Renders the engine's replies back through the gateway
//! - Sweeps idle sessions in the background
//! - Handles graceful shutdown with a bounded drain

pub mod dialogue;
pub mod session;
pub mod shutdown;
pub mod texts;

use std::sync::Arc;
use std::time::Duration;

use carelink_config::model::CarelinkConfig;
use carelink_core::error::CarelinkError;
use carelink_core::{ChatGateway, FeedbackStore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub use dialogue::{DialogueEngine, EngineOptions};

/// The main bot loop wiring the gateway to the dialogue engine.
///
/// Every inbound event is handled in its own spawned task; handling of
/// successive events is not serialized (the engine serializes per user
/// internally). On shutdown the loop stops pulling events, lets in-flight
/// handlers finish within the configured grace period, and closes storage.
pub struct BotLoop {
    gateway: Arc<dyn ChatGateway>,
    engine: Arc<DialogueEngine>,
    store: Arc<dyn FeedbackStore>,
    drain_grace: Duration,
    sweep_interval: Duration,
    idle_expiry: chrono::Duration,
}

impl BotLoop {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        engine: Arc<DialogueEngine>,
        store: Arc<dyn FeedbackStore>,
        config: &CarelinkConfig,
    ) -> Self {
        info!(bot_name = config.bot.name.as_str(), "bot loop initialized");
        Self {
            gateway,
            engine,
            store,
            drain_grace: Duration::from_secs(config.bot.drain_grace_secs),
            sweep_interval: Duration::from_secs(config.session.sweep_interval_secs),
            idle_expiry: chrono::Duration::hours(config.session.idle_expiry_hours as i64),
        }
    }

    /// Runs the main loop until the cancellation token is triggered.
    ///
    /// The loop:
    /// 1. Waits for inbound events from the gateway
    /// 2. Spawns a tracked handler task per event
    /// 3. On cancellation, drains in-flight handlers within the grace period
    /// 4. Closes storage
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), CarelinkError> {
        info!("bot loop running");

        let tracker = TaskTracker::new();

        // Idle-session sweeper.
        {
            let sessions = self.engine.sessions();
            let sweep_interval = self.sweep_interval;
            let idle_expiry = self.idle_expiry;
            let sweep_cancel = cancel.clone();
            tracker.spawn(async move {
                let mut interval = tokio::time::interval(sweep_interval);
                // Skip the immediate first tick.
                interval.tick().await;
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            sessions.evict_idle(idle_expiry);
                        }
                        _ = sweep_cancel.cancelled() => {
                            debug!("session sweeper shutting down");
                            break;
                        }
                    }
                }
            });
        }

        loop {
            tokio::select! {
                event = self.gateway.receive() => {
                    match event {
                        Ok(event) => {
                            let engine = self.engine.clone();
                            let gateway = self.gateway.clone();
                            tracker.spawn(async move {
                                let replies = engine.handle_event(event).await;
                                for reply in replies {
                                    if let Err(e) = gateway.send(reply).await {
                                        error!(error = %e, "failed to send reply");
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "gateway receive error");
                            // If the transport is gone, stop the loop.
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bot loop");
                    break;
                }
            }
        }

        // Idempotent when a signal got here first; on transport loss this
        // also stops the sweeper and anything else sharing the token.
        cancel.cancel();

        // Drain in-flight handlers within the grace period.
        tracker.close();
        if tokio::time::timeout(self.drain_grace, tracker.wait())
            .await
            .is_err()
        {
            warn!(
                grace_secs = self.drain_grace.as_secs(),
                "drain grace period elapsed, abandoning remaining handlers"
            );
        } else {
            info!("all in-flight handlers drained");
        }

        self.gateway.shutdown().await?;
        self.store.close().await?;

        info!("bot loop stopped");
        Ok(())
    }
}
