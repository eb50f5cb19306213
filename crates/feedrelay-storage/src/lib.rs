// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the feedrelay service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed CRUD operations for feedback
//! records and their uploads, and the crash-safe notification queue that
//! backs the at-least-once event channel.

pub mod adapter;
pub mod channel;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteRecordStore;
pub use channel::QueueChannel;
pub use database::Database;
pub use models::*;
