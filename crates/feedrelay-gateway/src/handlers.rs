// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the submission and housekeeping endpoints.
//!
//! Handles POST /upload, POST /comment, POST /caretaker, POST /flush,
//! GET /health.

use std::net::SocketAddr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Basic;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use feedrelay_intake::{CommentRequest, UploadRequest, finalize_comment, ingest_upload};

use crate::auth;
use crate::error::{error_response, reject};
use crate::server::GatewayState;

/// Query parameters for POST /upload.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Attachment filename (required).
    #[serde(default)]
    pub filename: Option<String>,
    /// Correlation token from an earlier upload call.
    #[serde(default)]
    pub token: Option<String>,
}

/// Response body for POST /upload: `{"upload":{"token":"<id>"}}`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub upload: UploadToken,
}

/// The correlation token wrapper inside [`UploadResponse`].
#[derive(Debug, Serialize)]
pub struct UploadToken {
    pub token: String,
}

/// Request body for POST /comment.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub request: CommentInner,
}

#[derive(Debug, Deserialize)]
pub struct CommentInner {
    pub requester: Requester,
    pub subject: String,
    pub comment: CommentDetails,
}

#[derive(Debug, Deserialize)]
pub struct Requester {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentDetails {
    pub body: String,
    /// Upload tokens; the first one is the correlation token.
    #[serde(default)]
    pub uploads: Option<Vec<String>>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// The media type (sans parameters) of a request, lowercased.
fn media_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
}

/// Client address: first X-Forwarded-For hop, else the peer address.
fn client_ip(headers: &HeaderMap, addr: &SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// POST /upload?filename=<name>[&token=<id>]
///
/// Stores one attachment for a feedback submission and returns the
/// correlation token tying the submission's calls together.
pub async fn post_upload(
    State(state): State<GatewayState>,
    Query(params): Query<UploadParams>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let email = match auth::authenticate(
        credentials.as_ref().map(|h| &h.0),
        state.shared_secret.as_deref(),
    ) {
        Ok(email) => email,
        Err(failure) => {
            warn!(code = failure.code(), "upload rejected");
            return reject(failure.code());
        }
    };

    let Some(filename) = params.filename.filter(|f| !f.is_empty()) else {
        return reject("BAD FILENAME");
    };
    if media_type(&headers).as_deref() != Some("application/binary") {
        return reject("BAD CONTENT");
    }
    if body.is_empty() || body.len() > state.limits.max_upload_size {
        return reject("BAD DATA");
    }

    let request = UploadRequest {
        email,
        client_ip: client_ip(&headers, &addr),
        filename,
        data: body.to_vec(),
        token: params.token,
    };

    match ingest_upload(state.store.as_ref(), &state.limits, request).await {
        Ok(token) => Json(UploadResponse {
            upload: UploadToken { token },
        })
        .into_response(),
        Err(err) => error_response("upload submit", &err),
    }
}

/// POST /comment
///
/// Finalizes a submission: fills in subject/message/name and publishes the
/// submitted notification. Returns plain "OK"; the client does not inspect
/// the payload.
pub async fn post_comment(
    State(state): State<GatewayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if media_type(&headers).as_deref() != Some("application/json") {
        return reject("BAD CONTENT");
    }

    let claimed_email = match auth::authenticate(
        credentials.as_ref().map(|h| &h.0),
        state.shared_secret.as_deref(),
    ) {
        Ok(email) => email,
        Err(failure) => {
            warn!(code = failure.code(), "comment rejected");
            return reject(failure.code());
        }
    };

    let parsed: CommentBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "comment body did not parse");
            return reject("BAD DATA");
        }
    };
    let inner = parsed.request;

    if inner.requester.email.is_empty() || inner.subject.is_empty() || inner.comment.body.is_empty()
    {
        return reject("BAD DATA");
    }

    // The credential identity must match the requester in the body.
    if claimed_email != inner.requester.email {
        warn!("comment rejected: credential identity does not match requester");
        return reject("BAD AUTH");
    }

    let token = inner.comment.uploads.and_then(|mut t| {
        if t.is_empty() { None } else { Some(t.remove(0)) }
    });

    let request = CommentRequest {
        email: inner.requester.email,
        client_ip: client_ip(&headers, &addr),
        subject: inner.subject,
        body: inner.comment.body,
        name: inner.requester.name,
        token,
    };

    match finalize_comment(
        state.store.as_ref(),
        state.channel.as_ref(),
        &state.limits,
        request,
    )
    .await
    {
        Ok(_) => "OK".into_response(),
        Err(err) => error_response("feedback submit", &err),
    }
}

/// POST /caretaker
///
/// Runs one reconciliation sweep. Intended to be invoked on a schedule.
pub async fn post_caretaker(State(state): State<GatewayState>) -> Response {
    match state.caretaker.sweep().await {
        Ok(report) => {
            info!(
                expired = report.expired,
                reaped = report.reaped,
                republished = report.republished,
                "caretaker trigger complete"
            );
            "OK".into_response()
        }
        Err(err) => error_response("caretaker task", &err),
    }
}

/// POST /flush
///
/// Immediately delivers every finalized-but-unarchived record, regardless
/// of age. A redelivery convenience for operators.
pub async fn post_flush(State(state): State<GatewayState>) -> Response {
    match state.deliverer.flush().await {
        Ok(sent) => {
            info!(sent, "flush complete");
            "OK".into_response()
        }
        Err(err) => error_response("flush", &err),
    }
}

/// GET /health
///
/// Unauthenticated liveness probe.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
