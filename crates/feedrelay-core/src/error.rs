// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the feedrelay service.

use thiserror::Error;

/// The primary error type used across all feedrelay adapter traits and core operations.
///
/// Variants map onto the caller-visible failure taxonomy: validation and
/// authentication failures carry no side effects, quota failures ask the
/// caller to retry later, and collaborator failures (`Store`, `Channel`,
/// `Transport`) are each repaired through a different path.
#[derive(Debug, Error)]
pub enum FeedrelayError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or missing input; the call had no side effect.
    #[error("validation error: {0}")]
    Validation(String),

    /// Credential/identity mismatch; the call had no side effect.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Too many open feedback records for one email address.
    #[error("too much open feedback for {email}: {open} records pending")]
    QuotaExceeded { email: String, open: u32 },

    /// A correlation token did not reference an existing feedback record.
    #[error("feedback record not found: {id}")]
    NotFound { id: String },

    /// Record store errors (database connection, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification channel errors (publish or consume failure).
    ///
    /// A publish failure after a successful store mutation leaves the record
    /// un-notified; the caretaker sweep repairs it.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Outbound mail transport errors. The record is never mutated on
    /// transport failure, so delivery stays retriable.
    #[error("mail transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FeedrelayError {
    /// Construct a `Store` error from any boxed-compatible source.
    pub fn store<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FeedrelayError::Store {
            source: Box::new(source),
        }
    }
}
