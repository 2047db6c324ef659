// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp channel adapter for the AgentKit relay.
//!
//! Inbound traffic arrives as webhooks from an Evolution API bridge; replies
//! go out through the bridge's REST API. The adapter surfaces chat messages,
//! pairing QR codes and connection changes as [`ChannelEvent`]s.

pub mod client;
pub mod handler;
pub mod webhook;

use agentkit_config::model::WhatsAppConfig;
use agentkit_core::{
    AdapterType, AgentKitError, ChannelAdapter, ChannelEvent, HealthStatus, MessageId,
    OutboundMessage, PluginAdapter,
};
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::client::{BridgeState, EvolutionClient};
use crate::webhook::WebhookState;

/// Capacity of the webhook-to-relay event queue.
const EVENT_QUEUE: usize = 256;

/// WhatsApp channel over an Evolution API bridge.
pub struct WhatsAppChannel {
    config: WhatsAppConfig,
    client: EvolutionClient,
    events_tx: mpsc::Sender<ChannelEvent>,
    events_rx: Mutex<mpsc::Receiver<ChannelEvent>>,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl WhatsAppChannel {
    pub fn new(config: WhatsAppConfig) -> Result<Self, AgentKitError> {
        let client = EvolutionClient::new(
            &config.api_url,
            &config.instance_name,
            config.api_key.as_deref(),
        )?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
        Ok(Self {
            config,
            client,
            events_tx,
            events_rx: Mutex::new(events_rx),
            server_handle: Mutex::new(None),
        })
    }

    /// Queues the event matching the bridge's current pairing state.
    async fn announce_bridge_state(&self) {
        let event = match self.client.connection_state().await {
            Ok(BridgeState::Open) => Some(ChannelEvent::Connected),
            Ok(state) => {
                info!(?state, "WhatsApp session not open, requesting pairing QR");
                match self.client.request_qr().await {
                    Ok(qr) => qr.map(ChannelEvent::QrCode),
                    Err(e) => {
                        warn!(error = %e, "failed to request pairing QR");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "bridge unreachable, waiting for webhook events");
                None
            }
        };
        if let Some(event) = event {
            let _ = self.events_tx.send(event).await;
        }
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        match self.client.connection_state().await {
            Ok(BridgeState::Open) => Ok(HealthStatus::Healthy),
            Ok(state) => Ok(HealthStatus::Degraded(format!("session state: {state:?}"))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        if let Some(handle) = self.server_handle.lock().await.take() {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for WhatsAppChannel {
    async fn connect(&mut self) -> Result<(), AgentKitError> {
        let state = WebhookState {
            events_tx: self.events_tx.clone(),
        };
        let handle =
            webhook::bind(&self.config.webhook_host, self.config.webhook_port, state).await?;
        *self.server_handle.lock().await = Some(handle);

        self.announce_bridge_state().await;
        info!(instance = %self.config.instance_name, "WhatsApp channel connected");
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, AgentKitError> {
        let id = self.client.send_text(&msg.chat_id, &msg.content).await?;
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<ChannelEvent, AgentKitError> {
        let mut rx = self.events_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| AgentKitError::channel("whatsapp event channel closed"))
    }
}
