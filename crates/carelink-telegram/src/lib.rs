// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat gateway for the Carelink feedback bot.
//!
//! Implements [`ChatGateway`] for the Telegram Bot API via teloxide,
//! providing long polling, message and callback-query routing, and inline
//! keyboard rendering.

pub mod handler;
pub mod keyboard;

use async_trait::async_trait;
use carelink_config::model::TelegramConfig;
use carelink_core::error::CarelinkError;
use carelink_core::traits::{ChatGateway, ServiceAdapter};
use carelink_core::types::{AdapterKind, ChatEvent, HealthStatus, MessageId, Reply};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram gateway implementing [`ChatGateway`].
///
/// Connects to Telegram via long polling, converts messages and button
/// presses into [`ChatEvent`]s, and renders replies with HTML formatting
/// and optional inline keyboards.
pub struct TelegramGateway {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<ChatEvent>>,
    inbound_tx: mpsc::Sender<ChatEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramGateway {
    /// Creates a new Telegram gateway.
    ///
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, CarelinkError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            CarelinkError::Config("telegram.bot_token is required to run the bot".into())
        })?;

        if token.is_empty() {
            return Err(CarelinkError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl ServiceAdapter for TelegramGateway {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, CarelinkError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), CarelinkError> {
        debug!("Telegram gateway shutting down");
        // The polling handle is dropped with the gateway, which aborts the
        // task. For graceful shutdown, the bot loop stops calling receive()
        // first.
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn connect(&mut self) -> Result<(), CarelinkError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();

        info!("starting Telegram long polling");

        let message_tx = self.inbound_tx.clone();
        let message_branch = Update::filter_message().endpoint(move |msg: Message| {
            let tx = message_tx.clone();
            async move {
                match handler::message_to_event(&msg) {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            warn!("inbound channel closed, dropping message");
                        }
                    }
                    None => {
                        debug!(msg_id = msg.id.0, "ignoring unsupported message");
                    }
                }
                respond(())
            }
        });

        let callback_tx = self.inbound_tx.clone();
        let callback_branch =
            Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                let tx = callback_tx.clone();
                async move {
                    // Acknowledge so the client stops the button spinner.
                    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                        debug!(error = %e, "failed to answer callback query");
                    }
                    match handler::callback_to_event(&query) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping callback");
                            }
                        }
                        None => {
                            warn!(data = ?query.data, "unknown callback data");
                        }
                    }
                    respond(())
                }
            });

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(message_branch)
                .branch(callback_branch);

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore other update kinds
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, reply: Reply) -> Result<MessageId, CarelinkError> {
        let chat_id = ChatId(reply.chat_id);

        let mut request = self
            .bot
            .send_message(Recipient::Id(chat_id), &reply.text)
            .parse_mode(ParseMode::Html);

        if let Some(ref kb) = reply.keyboard
            && !kb.is_empty()
        {
            request = request.reply_markup(keyboard::to_markup(kb));
        }

        let sent = request.await.map_err(|e| CarelinkError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<ChatEvent, CarelinkError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| CarelinkError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}
