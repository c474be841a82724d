// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat gateway trait for the messaging transport (Telegram).

use async_trait::async_trait;

use crate::error::CarelinkError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{ChatEvent, MessageId, Reply};

/// Adapter for the bidirectional chat transport.
///
/// The gateway consumes the transport's ordered event stream and renders
/// outbound replies (optionally with an inline button set) addressed by
/// chat destination ID.
#[async_trait]
pub trait ChatGateway: ServiceAdapter {
    /// Establishes the connection and starts consuming inbound events.
    async fn connect(&mut self) -> Result<(), CarelinkError>;

    /// Sends a reply through the transport.
    async fn send(&self, reply: Reply) -> Result<MessageId, CarelinkError>;

    /// Receives the next inbound event from the transport.
    async fn receive(&self) -> Result<ChatEvent, CarelinkError>;
}
