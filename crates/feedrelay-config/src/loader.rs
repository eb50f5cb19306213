// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./feedrelay.toml` > `~/.config/feedrelay/feedrelay.toml`
//! > `/etc/feedrelay/feedrelay.toml` with environment variable overrides via
//! `FEEDRELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FeedrelayConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/feedrelay/feedrelay.toml` (system-wide)
/// 3. `~/.config/feedrelay/feedrelay.toml` (user XDG config)
/// 4. `./feedrelay.toml` (local directory)
/// 5. `FEEDRELAY_*` environment variables
pub fn load_config() -> Result<FeedrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FeedrelayConfig::default()))
        .merge(Toml::file("/etc/feedrelay/feedrelay.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("feedrelay/feedrelay.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("feedrelay.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FeedrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FeedrelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FeedrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FeedrelayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `FEEDRELAY_AUTH_SHARED_SECRET`
/// must map to `auth.shared_secret`, not `auth.shared.secret`.
fn env_provider() -> Env {
    Env::prefixed("FEEDRELAY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FEEDRELAY_MAILER_MAILGUN_API_KEY -> "mailer_mailgun_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("limits_", "limits.", 1)
            .replacen("caretaker_", "caretaker.", 1)
            .replacen("delivery_", "delivery.", 1)
            .replacen("mailer_mailgun_", "mailer.mailgun.", 1)
            .replacen("mailer_smtp_", "mailer.smtp.", 1)
            .replacen("mailer_", "mailer.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn str_loader_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[server]
port = 9900

[limits]
max_pending = 2
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9900);
        assert_eq!(config.limits.max_pending, 2);
        // Untouched sections keep their defaults.
        assert_eq!(config.limits.max_uploads, 10);
    }

    #[test]
    fn env_vars_override_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "feedrelay.toml",
                r#"
[auth]
shared_secret = "from-toml"
"#,
            )?;
            jail.set_env("FEEDRELAY_AUTH_SHARED_SECRET", "from-env");
            jail.set_env("FEEDRELAY_MAILER_MAILGUN_API_KEY", "key-abc");

            let config = load_config().expect("config should load");
            assert_eq!(config.auth.shared_secret.as_deref(), Some("from-env"));
            assert_eq!(config.mailer.mailgun.api_key.as_deref(), Some("key-abc"));
            Ok(())
        });
    }

    #[test]
    fn underscore_keys_map_to_correct_sections() {
        Jail::expect_with(|jail| {
            jail.set_env("FEEDRELAY_LIMITS_MAX_UPLOAD_SIZE", "2048");
            jail.set_env("FEEDRELAY_CARETAKER_KEEP_HISTORY_DAYS", "7");

            let config = load_config().expect("config should load");
            assert_eq!(config.limits.max_upload_size, 2048);
            assert_eq!(config.caretaker.keep_history_days, 7);
            Ok(())
        });
    }
}
