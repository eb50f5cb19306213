// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential comparison for the submission endpoints.
//!
//! Clients authenticate with HTTP Basic: the username is the requester's
//! email suffixed with `/token`, and the password is the shared secret.
//! When no shared secret is configured, all requests are rejected
//! (fail-closed).

use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Basic;

/// Why a credential was rejected. Each variant has its own wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Username missing or not in `<email>/token` form.
    BadAuth,
    /// Shared secret missing, unconfigured, or wrong.
    BadToken,
}

impl AuthFailure {
    /// The plain-text wire code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::BadAuth => "BAD AUTH",
            AuthFailure::BadToken => "BAD TOKEN",
        }
    }
}

/// Verify the Basic credential and return the email identity it claims.
///
/// The caller still has to check the claimed email against any identity in
/// the request body -- a mismatch there is also [`AuthFailure::BadAuth`].
pub fn authenticate(
    credentials: Option<&Authorization<Basic>>,
    shared_secret: Option<&str>,
) -> Result<String, AuthFailure> {
    let Some(credentials) = credentials else {
        return Err(AuthFailure::BadAuth);
    };

    let username = credentials.username();
    if username.is_empty() {
        return Err(AuthFailure::BadAuth);
    }
    let Some(email) = username.strip_suffix("/token") else {
        return Err(AuthFailure::BadAuth);
    };
    if email.is_empty() {
        return Err(AuthFailure::BadAuth);
    }

    let Some(shared_secret) = shared_secret else {
        tracing::error!("no shared secret configured -- rejecting request");
        return Err(AuthFailure::BadToken);
    };
    let password = credentials.password();
    if password.is_empty() || password != shared_secret {
        return Err(AuthFailure::BadToken);
    }

    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(username: &str, password: &str) -> Authorization<Basic> {
        Authorization::basic(username, password)
    }

    #[test]
    fn valid_credentials_yield_the_email() {
        let auth = basic("ann@example.com/token", "hunter2");
        let email = authenticate(Some(&auth), Some("hunter2")).unwrap();
        assert_eq!(email, "ann@example.com");
    }

    #[test]
    fn missing_credentials_are_bad_auth() {
        assert_eq!(
            authenticate(None, Some("hunter2")).unwrap_err(),
            AuthFailure::BadAuth
        );
    }

    #[test]
    fn username_without_token_suffix_is_bad_auth() {
        let auth = basic("ann@example.com", "hunter2");
        assert_eq!(
            authenticate(Some(&auth), Some("hunter2")).unwrap_err(),
            AuthFailure::BadAuth
        );
    }

    #[test]
    fn wrong_secret_is_bad_token() {
        let auth = basic("ann@example.com/token", "wrong");
        assert_eq!(
            authenticate(Some(&auth), Some("hunter2")).unwrap_err(),
            AuthFailure::BadToken
        );
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        let auth = basic("ann@example.com/token", "hunter2");
        assert_eq!(
            authenticate(Some(&auth), None).unwrap_err(),
            AuthFailure::BadToken
        );
    }

    #[test]
    fn empty_password_is_bad_token() {
        let auth = basic("ann@example.com/token", "");
        assert_eq!(
            authenticate(Some(&auth), Some("hunter2")).unwrap_err(),
            AuthFailure::BadToken
        );
    }
}
