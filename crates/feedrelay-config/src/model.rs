// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the feedrelay service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level feedrelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// secrets (shared secret, mailer credentials) have no defaults and must be
/// supplied before serving.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedrelayConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP server bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Client credential settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Submission quota and upload limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Caretaker retention and retry windows.
    #[serde(default)]
    pub caretaker: CaretakerConfig,

    /// Notification delivery worker settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Outbound mail transport settings.
    #[serde(default)]
    pub mailer: MailerConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Client credential configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared secret presented by clients as the Basic-auth password.
    /// `None` refuses all submissions; required before serving.
    #[serde(default)]
    pub shared_secret: Option<String>,
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("feedrelay").join("feedrelay.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "feedrelay.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Submission quota and upload limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum simultaneously open (unarchived) records per email address.
    /// A soft cap: checked at creation, not enforced under races.
    #[serde(default = "default_max_pending")]
    pub max_pending: u32,

    /// Maximum non-placeholder uploads per feedback record.
    #[serde(default = "default_max_uploads")]
    pub max_uploads: u32,

    /// Maximum raw size of a single upload, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pending: default_max_pending(),
            max_uploads: default_max_uploads(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

fn default_max_pending() -> u32 {
    5
}

fn default_max_uploads() -> u32 {
    10
}

fn default_max_upload_size() -> usize {
    1024 * 1024
}

/// Caretaker retention and retry windows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CaretakerConfig {
    /// Days to keep archived records before deletion.
    #[serde(default = "default_keep_history_days")]
    pub keep_history_days: u32,

    /// Hours after which a finalized but unarchived record is considered
    /// stuck and its notification is republished.
    #[serde(default = "default_republish_after_hours")]
    pub republish_after_hours: u32,

    /// Seconds of grace before a draft with no comment is reaped.
    #[serde(default = "default_reap_grace_secs")]
    pub reap_grace_secs: u32,
}

impl Default for CaretakerConfig {
    fn default() -> Self {
        Self {
            keep_history_days: default_keep_history_days(),
            republish_after_hours: default_republish_after_hours(),
            reap_grace_secs: default_reap_grace_secs(),
        }
    }
}

fn default_keep_history_days() -> u32 {
    30
}

fn default_republish_after_hours() -> u32 {
    24
}

fn default_reap_grace_secs() -> u32 {
    300
}

/// Notification delivery worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Name of the durable notification queue.
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Milliseconds the worker sleeps when the queue is empty.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue: default_queue(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_queue() -> String {
    "feedback-notifications".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// Which outbound mail transport to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    #[default]
    Mailgun,
    Smtp,
}

/// Outbound mail transport configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailerConfig {
    /// Transport backend.
    #[serde(default)]
    pub transport: MailTransportKind,

    /// Generated sender address feedback is forwarded from.
    #[serde(default)]
    pub sender: String,

    /// Address feedback is forwarded to.
    #[serde(default)]
    pub recipient: String,

    /// Mailgun REST API settings (used when `transport = "mailgun"`).
    #[serde(default)]
    pub mailgun: MailgunConfig,

    /// SMTP settings (used when `transport = "smtp"`).
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Mailgun REST API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailgunConfig {
    /// API endpoint base. Overridable for testing against a local stub.
    #[serde(default = "default_mailgun_base_url")]
    pub base_url: String,

    /// Mailgun sending domain.
    #[serde(default)]
    pub api_domain: String,

    /// Mailgun API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            base_url: default_mailgun_base_url(),
            api_domain: String::new(),
            api_key: None,
        }
    }
}

fn default_mailgun_base_url() -> String {
    "https://api.mailgun.net".to_string()
}

/// SMTP relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// SMTP relay hostname.
    #[serde(default)]
    pub host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP username. `None` disables authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: None,
            password: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}
