// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered fallback over reply strategies.
//!
//! Strategies are tried in order until one succeeds. The gateway never
//! returns an error: exhausting the chain yields a failed [`AiReply`].

use std::sync::Arc;

use agentkit_core::{AiReply, ChatMessage, ConversationContext, HealthStatus, ReplyStrategy};
use dashmap::DashMap;
use tracing::{debug, warn};

/// Text carried by a failed reply.
pub const FAILURE_TEXT: &str = "Desculpe, ocorreu um erro ao processar sua solicitação.";

pub struct AiGateway {
    strategies: Vec<Arc<dyn ReplyStrategy>>,
    executions: DashMap<String, u64>,
}

impl AiGateway {
    pub fn new(strategies: Vec<Arc<dyn ReplyStrategy>>) -> Self {
        Self {
            strategies,
            executions: DashMap::new(),
        }
    }

    /// Names of the strategies in fallback order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Produces a reply for `input`. `history` excludes `input`.
    pub async fn produce(
        &self,
        input: &str,
        context: &ConversationContext,
        history: &[ChatMessage],
    ) -> AiReply {
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy.produce_reply(input, Some(context), history).await {
                Ok(text) => {
                    *self.executions.entry(context.chat_id.clone()).or_insert(0) += 1;
                    debug!(strategy = strategy.name(), chat_id = %context.chat_id, "reply produced");
                    return AiReply::ok(text);
                }
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        chat_id = %context.chat_id,
                        error = %e,
                        "reply strategy failed, trying next"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        AiReply::failed(
            FAILURE_TEXT,
            last_error.unwrap_or_else(|| "no reply strategies configured".to_string()),
        )
    }

    /// Forgets the chat's counter and any per-chat state the strategies hold.
    pub async fn clear(&self, chat_id: &str) {
        self.executions.remove(chat_id);
        for strategy in &self.strategies {
            strategy.clear_session(chat_id).await;
        }
    }

    /// Successful reply counts per chat, sorted by chat id.
    pub fn stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<(String, u64)> = self
            .executions
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        stats.sort();
        stats
    }

    /// True if any strategy reports healthy. Degraded strategies, including
    /// those with no health check, never decide reachability on their own.
    pub async fn check_connection(&self) -> bool {
        for strategy in &self.strategies {
            match strategy.health_check().await {
                Ok(HealthStatus::Healthy) => return true,
                Ok(status) => debug!(strategy = strategy.name(), ?status, "strategy not healthy"),
                Err(e) => warn!(strategy = strategy.name(), error = %e, "health check failed"),
            }
        }
        false
    }

    pub async fn shutdown(&self) {
        for strategy in &self.strategies {
            if let Err(e) = strategy.shutdown().await {
                warn!(strategy = strategy.name(), error = %e, "strategy shutdown failed");
            }
        }
    }
}
