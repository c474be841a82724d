// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Carelink feedback bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use carelink_core::Locale;
use serde::{Deserialize, Serialize};

/// Top-level Carelink configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CarelinkConfig {
    /// Dialogue behavior and bot identity settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// SMTP notifier settings.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Health endpoint HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-user conversation session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Startup connection retry settings.
    #[serde(default)]
    pub startup: StartupConfig,
}

/// Dialogue behavior and bot identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Locale of the dialogue texts and category synonyms.
    #[serde(default)]
    pub locale: Locale,

    /// Render inline button keyboards alongside prompts.
    #[serde(default = "default_true")]
    pub inline_buttons: bool,

    /// Accept media attachments on submissions. When false, only the text
    /// or caption is captured.
    #[serde(default = "default_true")]
    pub accept_media: bool,

    /// Numeric user ID authorized to view `/stats`. `None` denies everyone.
    #[serde(default)]
    pub admin_user_id: Option<i64>,

    /// Fixed UTC offset (hours) for record creation timestamps, matching
    /// the deployment's civil time.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,

    /// Grace period for draining in-flight handlers on shutdown.
    #[serde(default = "default_drain_grace_secs")]
    pub drain_grace_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            locale: Locale::default(),
            inline_buttons: default_true(),
            accept_media: default_true(),
            admin_user_id: None,
            utc_offset_hours: default_utc_offset_hours(),
            drain_grace_secs: default_drain_grace_secs(),
        }
    }
}

fn default_bot_name() -> String {
    "carelink".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_utc_offset_hours() -> i8 {
    5
}

fn default_drain_grace_secs() -> u64 {
    30
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required to run the bot.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Bound on any single store operation, in seconds.
    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_true(),
            op_timeout_secs: default_op_timeout_secs(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("carelink").join("carelink.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("carelink.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_op_timeout_secs() -> u64 {
    10
}

/// SMTP notifier configuration.
///
/// Notification is feature-disabled (non-fatal) when `from_address`,
/// `to_address`, or `password` is empty.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP relay port (STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Sender mailbox; also used as the authentication username.
    #[serde(default)]
    pub from_address: String,

    /// Staff mailbox that receives the notifications.
    #[serde(default)]
    pub to_address: String,

    /// Authentication password for `from_address`.
    #[serde(default)]
    pub password: String,

    /// Bound on a single send, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            from_address: String::new(),
            to_address: String::new(),
            password: String::new(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_send_timeout_secs() -> u64 {
    15
}

/// Health endpoint HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the health server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the health server.
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_server_port(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

/// Per-user conversation session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Evict sessions unseen for this many hours.
    #[serde(default = "default_idle_expiry_hours")]
    pub idle_expiry_hours: u64,

    /// Interval between eviction sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_expiry_hours: default_idle_expiry_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_idle_expiry_hours() -> u64 {
    24
}

fn default_sweep_interval_secs() -> u64 {
    600
}

/// Startup connection retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StartupConfig {
    /// Maximum store connection attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    30
}

fn default_retry_delay_secs() -> u64 {
    2
}
