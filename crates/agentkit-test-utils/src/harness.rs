// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end relay testing.
//!
//! `TestHarness` assembles a [`MessageRelay`] with a mock channel, a mock
//! reply strategy, and a mock log store. `send()` drives one inbound
//! message through the full relay pipeline.

use std::sync::Arc;

use agentkit_core::{ChannelAdapter, InboundMessage, MessageLog, ReplyStrategy};
use agentkit_relay::{AiGateway, MessageRelay, RelayConfig, RelayOutcome};

use crate::mock_channel::MockChannel;
use crate::mock_log::MockLog;
use crate::mock_strategy::MockStrategy;

/// Build a private-chat text message.
pub fn inbound(chat_id: &str, sender_name: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: format!("test-{}", uuid::Uuid::new_v4()),
        chat_id: chat_id.to_string(),
        sender_name: sender_name.to_string(),
        text: text.to_string(),
        message_type: "conversation".to_string(),
        is_group: chat_id.ends_with("@g.us"),
        from_me: false,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Builder for creating relay test environments.
pub struct TestHarnessBuilder {
    strategy: Option<MockStrategy>,
    config: RelayConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            strategy: None,
            config: RelayConfig::default(),
        }
    }

    /// Scripted strategy replies, returned in order.
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.strategy = Some(MockStrategy::with_replies("mock", replies));
        self
    }

    pub fn with_strategy(mut self, strategy: MockStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    pub fn with_bot_name(mut self, name: &str) -> Self {
        self.config.bot_name = name.to_string();
        self
    }

    pub fn build(self) -> TestHarness {
        let strategy = Arc::new(self.strategy.unwrap_or_else(|| MockStrategy::echo("mock")));
        let channel = Arc::new(MockChannel::new());
        let log = Arc::new(MockLog::new());

        let gateway = AiGateway::new(vec![strategy.clone() as Arc<dyn ReplyStrategy>]);
        let relay = Arc::new(MessageRelay::new(
            channel.clone() as Arc<dyn ChannelAdapter>,
            gateway,
            log.clone() as Arc<dyn MessageLog>,
            self.config,
        ));

        TestHarness {
            relay,
            channel,
            strategy,
            log,
        }
    }
}

/// A relay wired to mock adapters.
pub struct TestHarness {
    pub relay: Arc<MessageRelay>,
    pub channel: Arc<MockChannel>,
    pub strategy: Arc<MockStrategy>,
    pub log: Arc<MockLog>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Process one private-chat message and return what the relay did.
    pub async fn send(&self, chat_id: &str, sender_name: &str, text: &str) -> RelayOutcome {
        self.relay
            .handle_inbound(inbound(chat_id, sender_name, text))
            .await
    }

    /// Texts the relay sent to `chat_id`, in order.
    pub async fn replies_to(&self, chat_id: &str) -> Vec<String> {
        self.channel.sent_to(chat_id).await
    }
}
