// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as sane UTC offsets, non-empty paths, and non-zero
//! timeouts.

use crate::diagnostic::ConfigError;
use crate::model::CarelinkConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CarelinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.op_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.op_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.smtp.send_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "smtp.send_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.smtp.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "smtp.host must not be empty".to_string(),
        });
    }

    if config.server.bind_address.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.bind_address must not be empty".to_string(),
        });
    } else {
        let addr = config.server.bind_address.trim();
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "server.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    // Real-world civil offsets span UTC-12 to UTC+14.
    if !(-12..=14).contains(&config.bot.utc_offset_hours) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.utc_offset_hours must be between -12 and 14, got {}",
                config.bot.utc_offset_hours
            ),
        });
    }

    if config.session.idle_expiry_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "session.idle_expiry_hours must be at least 1".to_string(),
        });
    }

    if config.session.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if config.startup.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "startup.max_attempts must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
