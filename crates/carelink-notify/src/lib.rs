// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP staff notifier for the Carelink feedback bot.
//!
//! Sends one plain-text email per persisted feedback record through a
//! STARTTLS relay. Delivery is best-effort: callers treat failure as
//! non-fatal and the already-committed store write is never rolled back.

pub mod message;

use std::time::Duration;

use async_trait::async_trait;
use carelink_config::model::SmtpConfig;
use carelink_core::error::CarelinkError;
use carelink_core::traits::{Notifier, ServiceAdapter};
use carelink_core::types::{AdapterKind, FeedbackRecord, HealthStatus, Locale};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// SMTP notifier implementing [`Notifier`].
///
/// The transport is built once; each notification is a single synchronous
/// send bounded by the configured timeout. When any of from/to/password is
/// empty, [`notify`](Notifier::notify) fails fast without a network call.
pub struct SmtpNotifier {
    config: SmtpConfig,
    locale: Locale,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Creates a new SMTP notifier for the given relay configuration.
    pub fn new(config: SmtpConfig, locale: Locale) -> Result<Self, CarelinkError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| CarelinkError::Notify {
                message: format!("invalid SMTP relay `{}`: {e}", config.host),
                source: Some(Box::new(e)),
            })?
            .port(config.port)
            .credentials(Credentials::new(
                config.from_address.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.send_timeout_secs)))
            .build();

        Ok(Self {
            config,
            locale,
            transport,
        })
    }

    /// Whether the configuration is complete enough to attempt delivery.
    ///
    /// Incomplete configuration is non-fatal at startup: the bot runs with
    /// notification disabled and records simply stay `new`.
    pub fn is_configured(config: &SmtpConfig) -> bool {
        !config.from_address.is_empty()
            && !config.to_address.is_empty()
            && !config.password.is_empty()
    }
}

#[async_trait]
impl ServiceAdapter for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, CarelinkError> {
        if !Self::is_configured(&self.config) {
            return Ok(HealthStatus::Degraded(
                "notifier disabled: incomplete SMTP configuration".into(),
            ));
        }
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Unhealthy("SMTP relay refused NOOP".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("SMTP relay unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), CarelinkError> {
        debug!("SMTP notifier shutting down");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, record: &FeedbackRecord) -> Result<(), CarelinkError> {
        if !Self::is_configured(&self.config) {
            return Err(CarelinkError::Notify {
                message: "email configuration is incomplete".into(),
                source: None,
            });
        }

        let from = self
            .config
            .from_address
            .parse()
            .map_err(|e: lettre::address::AddressError| CarelinkError::Notify {
                message: format!("invalid from address `{}`: {e}", self.config.from_address),
                source: Some(Box::new(e)),
            })?;
        let to = self
            .config
            .to_address
            .parse()
            .map_err(|e: lettre::address::AddressError| CarelinkError::Notify {
                message: format!("invalid to address `{}`: {e}", self.config.to_address),
                source: Some(Box::new(e)),
            })?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message::subject(record, self.locale))
            .header(ContentType::TEXT_PLAIN)
            .body(message::body(record, self.locale))
            .map_err(|e| CarelinkError::Notify {
                message: format!("failed to build notification: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.transport
            .send(email)
            .await
            .map_err(|e| CarelinkError::Notify {
                message: format!("failed to send notification: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(feedback_id = record.id, "notification delivered");
        Ok(())
    }
}
