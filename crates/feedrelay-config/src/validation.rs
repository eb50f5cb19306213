// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, non-zero limits, and plausible
//! mail addresses.

use crate::diagnostic::ConfigError;
use crate::model::FeedrelayConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FeedrelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.limits.max_pending == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.max_pending must be at least 1".to_string(),
        });
    }

    if config.limits.max_uploads == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.max_uploads must be at least 1".to_string(),
        });
    }

    if config.limits.max_upload_size == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.max_upload_size must be at least 1 byte".to_string(),
        });
    }

    if config.caretaker.keep_history_days == 0 {
        errors.push(ConfigError::Validation {
            message: "caretaker.keep_history_days must be at least 1".to_string(),
        });
    }

    if config.caretaker.republish_after_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "caretaker.republish_after_hours must be at least 1".to_string(),
        });
    }

    if config.delivery.queue.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "delivery.queue must not be empty".to_string(),
        });
    }

    if config.delivery.poll_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.poll_interval_ms must be at least 1".to_string(),
        });
    }

    // Mail addresses are validated only when set; whether they are required
    // at all depends on the command (serve needs them, sweep does not).
    for (key, value) in [
        ("mailer.sender", &config.mailer.sender),
        ("mailer.recipient", &config.mailer.recipient),
    ] {
        if !value.is_empty() && !value.contains('@') {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{value}` is not a valid mail address"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
