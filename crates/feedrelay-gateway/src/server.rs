// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use feedrelay_caretaker::Caretaker;
use feedrelay_config::model::LimitsConfig;
use feedrelay_core::{EventChannel, FeedrelayError, RecordStore};
use feedrelay_mailer::DeliveryHandler;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Record store behind the submission endpoints.
    pub store: Arc<dyn RecordStore>,
    /// Notification channel the comment endpoint publishes to.
    pub channel: Arc<dyn EventChannel>,
    /// Reconciliation sweep behind POST /caretaker.
    pub caretaker: Arc<Caretaker>,
    /// Delivery handler behind POST /flush.
    pub deliverer: Arc<DeliveryHandler>,
    /// Submission quota and upload limits.
    pub limits: LimitsConfig,
    /// Shared secret clients present as the Basic-auth password.
    pub shared_secret: Option<String>,
}

/// Gateway server configuration (mirrors ServerConfig from feedrelay-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - POST /upload, POST /comment (credential-checked in the handlers)
/// - POST /caretaker, POST /flush (housekeeping triggers)
/// - GET /health (unauthenticated liveness)
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/upload", post(handlers::post_upload))
        .route("/comment", post(handlers::post_comment))
        .route("/caretaker", post(handlers::post_caretaker))
        .route("/flush", post(handlers::post_flush))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the task is aborted.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), FeedrelayError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FeedrelayError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| FeedrelayError::Channel {
        message: format!("gateway server error: {e}"),
        source: Some(Box::new(e)),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use feedrelay_caretaker::CaretakerPolicy;
    use feedrelay_config::model::CaretakerConfig;
    use feedrelay_test_utils::{MemoryStore, MockChannel, MockMailer};
    use tower::ServiceExt;

    const SECRET: &str = "hunter2";

    struct Fixture {
        store: Arc<MemoryStore>,
        channel: Arc<MockChannel>,
        mailer: Arc<MockMailer>,
        app: Router,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let channel = Arc::new(MockChannel::new());
        let mailer = Arc::new(MockMailer::new());

        let caretaker = Arc::new(Caretaker::new(
            store.clone(),
            channel.clone(),
            CaretakerPolicy::from_config(&CaretakerConfig::default()),
        ));
        let deliverer = Arc::new(DeliveryHandler::new(
            store.clone(),
            mailer.clone(),
            "relay@example.com",
            "support@example.com",
        ));

        let state = GatewayState {
            store: store.clone(),
            channel: channel.clone(),
            caretaker,
            deliverer,
            limits: LimitsConfig::default(),
            shared_secret: Some(SECRET.to_string()),
        };

        let app = router(state)
            .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4242))));

        Fixture {
            store,
            channel,
            mailer,
            app,
        }
    }

    fn basic_auth(email: &str, password: &str) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!("{email}/token:{password}"))
        )
    }

    fn upload_request(query: &str, auth: &str, content_type: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/upload{query}"))
            .header("authorization", auth)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap()
    }

    fn comment_request(auth: &str, json: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/comment")
            .header("authorization", auth)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn upload_then_comment_lifecycle() {
        let fixture = fixture();
        let auth = basic_auth("ann@example.com", SECRET);

        // Upload a 500 KB attachment with no token.
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=photo.png",
                &auth,
                "application/binary",
                vec![0u8; 500 * 1024],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        let token = body["upload"]["token"].as_str().unwrap().to_string();
        assert!(!token.is_empty());

        // Finalize with the token.
        let response = fixture
            .app
            .clone()
            .oneshot(comment_request(
                &auth,
                serde_json::json!({
                    "request": {
                        "requester": {"email": "ann@example.com", "name": "Ann"},
                        "subject": "Bug",
                        "comment": {"body": "Crashes", "uploads": [token]}
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");

        let record = fixture.store.record(&token).await.unwrap();
        assert!(!record.is_draft());
        assert_eq!(record.client_ip, "192.0.2.1");
        assert_eq!(fixture.channel.published_count().await, 1);
    }

    #[tokio::test]
    async fn upload_error_codes() {
        let fixture = fixture();
        let auth = basic_auth("ann@example.com", SECRET);

        // Wrong shared secret.
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=a.png",
                &basic_auth("ann@example.com", "wrong"),
                "application/binary",
                vec![1],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "BAD TOKEN");

        // Username without the /token suffix.
        let bad_auth = format!("Basic {}", BASE64.encode(format!("ann@example.com:{SECRET}")));
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=a.png",
                &bad_auth,
                "application/binary",
                vec![1],
            ))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD AUTH");

        // Missing filename.
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request("", &auth, "application/binary", vec![1]))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD FILENAME");

        // Wrong content type.
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=a.png",
                &auth,
                "text/plain",
                vec![1],
            ))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD CONTENT");

        // Empty body.
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=a.png",
                &auth,
                "application/binary",
                vec![],
            ))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD DATA");

        // Unknown correlation token.
        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=a.png&token=no-such-token",
                &auth,
                "application/binary",
                vec![1],
            ))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD DATA");
    }

    #[tokio::test]
    async fn sixth_open_submission_is_rejected_with_quota_code() {
        let fixture = fixture();
        let auth = basic_auth("ann@example.com", SECRET);

        for _ in 0..5 {
            let response = fixture
                .app
                .clone()
                .oneshot(upload_request(
                    "?filename=a.png",
                    &auth,
                    "application/binary",
                    vec![1],
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = fixture
            .app
            .clone()
            .oneshot(upload_request(
                "?filename=a.png",
                &auth,
                "application/binary",
                vec![1],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "TOO MUCH FEEDBACK");
        assert_eq!(fixture.store.record_count().await, 5);
    }

    #[tokio::test]
    async fn comment_identity_mismatch_is_bad_auth() {
        let fixture = fixture();

        let response = fixture
            .app
            .clone()
            .oneshot(comment_request(
                &basic_auth("mallory@example.com", SECRET),
                serde_json::json!({
                    "request": {
                        "requester": {"email": "ann@example.com"},
                        "subject": "Bug",
                        "comment": {"body": "Crashes"}
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "BAD AUTH");
        assert_eq!(fixture.store.record_count().await, 0);
    }

    #[tokio::test]
    async fn comment_content_and_data_codes() {
        let fixture = fixture();
        let auth = basic_auth("ann@example.com", SECRET);

        // Wrong content type.
        let response = fixture
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/comment")
                    .header("authorization", &auth)
                    .header("content-type", "text/plain")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD CONTENT");

        // Unparsable body.
        let response = fixture
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/comment")
                    .header("authorization", &auth)
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD DATA");

        // Empty subject.
        let response = fixture
            .app
            .clone()
            .oneshot(comment_request(
                &auth,
                serde_json::json!({
                    "request": {
                        "requester": {"email": "ann@example.com"},
                        "subject": "",
                        "comment": {"body": "Crashes"}
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "BAD DATA");
    }

    #[tokio::test]
    async fn comment_publish_failure_reports_publish_fail() {
        let fixture = fixture();
        fixture.channel.set_fail_publish(true);

        let response = fixture
            .app
            .clone()
            .oneshot(comment_request(
                &basic_auth("ann@example.com", SECRET),
                serde_json::json!({
                    "request": {
                        "requester": {"email": "ann@example.com"},
                        "subject": "Bug",
                        "comment": {"body": "Crashes"}
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "PUBLISH FAIL");

        // The record exists, finalized but un-notified.
        assert_eq!(fixture.store.record_count().await, 1);
    }

    #[tokio::test]
    async fn caretaker_flush_and_health_endpoints() {
        let fixture = fixture();

        let response = fixture
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/caretaker")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");

        let response = fixture
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/flush")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(fixture.mailer.sent_count().await, 0);

        let response = fixture
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn get_on_post_routes_is_method_not_allowed() {
        let fixture = fixture();
        let response = fixture
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/upload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
