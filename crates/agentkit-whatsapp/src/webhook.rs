// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook receiver for bridge events.
//!
//! Routes:
//! - `POST /webhook/whatsapp` (event name in the payload)
//! - `POST /webhook/whatsapp/{event}` (per-event webhook mode)
//! - `GET /health`
//!
//! Every webhook call is acknowledged with 200 immediately, even when the
//! body is unparseable, so the bridge never retries.

use agentkit_core::{AgentKitError, ChannelEvent};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::handler;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub events_tx: mpsc::Sender<ChannelEvent>,
}

/// Builds the webhook router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/whatsapp", post(receive))
        .route("/webhook/whatsapp/{event}", post(receive_event))
        .with_state(state)
}

/// Binds `host:port` and serves the webhook router until the task is aborted.
pub async fn bind(
    host: &str,
    port: u16,
    state: WebhookState,
) -> Result<tokio::task::JoinHandle<()>, AgentKitError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AgentKitError::Channel {
            message: format!("failed to bind webhook listener on {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("WhatsApp webhook listening on {addr}");

    let app = router(state);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "webhook server error");
        }
    }))
}

async fn health() -> &'static str {
    "ok"
}

async fn receive(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    dispatch(&state, &body, None).await;
    StatusCode::OK
}

async fn receive_event(
    State(state): State<WebhookState>,
    Path(event): Path<String>,
    body: Bytes,
) -> StatusCode {
    dispatch(&state, &body, Some(&event)).await;
    StatusCode::OK
}

async fn dispatch(state: &WebhookState, body: &[u8], path_event: Option<&str>) {
    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "discarding non-JSON webhook body");
            return;
        }
    };

    for event in handler::parse_webhook(&payload, path_event) {
        if state.events_tx.send(event).await.is_err() {
            warn!("webhook event dropped: channel receiver closed");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> (Router, mpsc::Receiver<ChannelEvent>) {
        let (events_tx, events_rx) = mpsc::channel(8);
        (router(WebhookState { events_tx }), events_rx)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (app, _rx) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn message_webhook_forwards_event() {
        let (app, mut rx) = app();
        let payload = json!({
            "event": "messages.upsert",
            "data": {
                "key": {"remoteJid": "5511999@s.whatsapp.net", "fromMe": false, "id": "A1"},
                "pushName": "Ana",
                "message": {"conversation": "Oi"}
            }
        });

        let response = app.oneshot(post_json("/webhook/whatsapp", &payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        match rx.recv().await {
            Some(ChannelEvent::Message(msg)) => assert_eq!(msg.text, "Oi"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn per_event_path_is_accepted() {
        let (app, mut rx) = app();
        let payload = json!({"data": {"state": "open"}});
        let response = app
            .oneshot(post_json("/webhook/whatsapp/connection-update", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(matches!(rx.recv().await, Some(ChannelEvent::Connected)));
    }

    #[tokio::test]
    async fn garbage_body_is_still_acknowledged() {
        let (app, mut rx) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/webhook/whatsapp")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(rx.try_recv().is_err());
    }
}
