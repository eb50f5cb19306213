// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics rendered via miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic metadata for rendering.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ConfigError {
    /// A figment extraction error (unknown key, type mismatch, bad TOML).
    #[error("{message}")]
    #[diagnostic(
        code(feedrelay::config::extract),
        help("check feedrelay.toml and FEEDRELAY_* environment variables")
    )]
    Extract {
        /// Rendered figment error message.
        message: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(feedrelay::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(feedrelay::config::other))]
    Other(String),
}

/// Convert a figment error (which may aggregate several failures) into
/// individual diagnostics.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Extract {
            message: e.to_string(),
        })
        .collect()
}

/// Render all collected errors to stderr as miette reports.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{:?}", miette::Report::new(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figment_errors_convert_to_diagnostics() {
        let err = crate::loader::load_config_from_str("server = \"not a table\"").unwrap_err();
        let errors = figment_to_config_errors(err);
        assert!(!errors.is_empty());
        assert!(matches!(errors[0], ConfigError::Extract { .. }));
    }

    #[test]
    fn validation_error_displays_message() {
        let err = ConfigError::Validation {
            message: "server.port must not be 0".into(),
        };
        assert!(err.to_string().contains("server.port"));
    }
}
