// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire error codes.
//!
//! Failures leave the gateway as plain text with HTTP 400. Clients treat
//! the text as an opaque code; the detail goes to the log, not the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use feedrelay_core::FeedrelayError;

/// The plain-text wire code for a service error.
pub fn error_code(err: &FeedrelayError) -> &'static str {
    match err {
        FeedrelayError::Auth(_) => "BAD AUTH",
        FeedrelayError::Validation(_) => "BAD DATA",
        FeedrelayError::NotFound { .. } => "BAD DATA",
        FeedrelayError::QuotaExceeded { .. } => "TOO MUCH FEEDBACK",
        FeedrelayError::Store { .. } => "STORE FAIL",
        FeedrelayError::Channel { .. } => "PUBLISH FAIL",
        FeedrelayError::Transport { .. }
        | FeedrelayError::Config(_)
        | FeedrelayError::Internal(_) => "INTERNAL FAIL",
    }
}

/// Convert a service error into its wire response, logging the detail.
pub fn error_response(context: &str, err: &FeedrelayError) -> Response {
    tracing::error!(error = %err, "{context} failed");
    reject(error_code(err))
}

/// A bare 400 with a wire code.
pub fn reject(code: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, code).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_wire_codes() {
        assert_eq!(error_code(&FeedrelayError::Auth("x".into())), "BAD AUTH");
        assert_eq!(
            error_code(&FeedrelayError::Validation("x".into())),
            "BAD DATA"
        );
        assert_eq!(
            error_code(&FeedrelayError::NotFound { id: "x".into() }),
            "BAD DATA"
        );
        assert_eq!(
            error_code(&FeedrelayError::QuotaExceeded {
                email: "a@b.com".into(),
                open: 5
            }),
            "TOO MUCH FEEDBACK"
        );
        assert_eq!(
            error_code(&FeedrelayError::Store {
                source: "x".into()
            }),
            "STORE FAIL"
        );
        assert_eq!(
            error_code(&FeedrelayError::Channel {
                message: "x".into(),
                source: None
            }),
            "PUBLISH FAIL"
        );
    }
}
