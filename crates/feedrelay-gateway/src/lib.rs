// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the feedrelay service.
//!
//! Thin request routing over the intake, caretaker, and delivery
//! components: credential comparison, wire error codes, and JSON/plain-text
//! response shapes. All stateful logic lives behind the capability traits.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, router, start_server};
