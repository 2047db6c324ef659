// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply strategy for deterministic testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use agentkit_core::{
    AdapterType, AgentKitError, ChatMessage, ConversationContext, HealthStatus, PluginAdapter,
    ReplyStrategy,
};

enum Behavior {
    /// Pop scripted replies; fall back to a default once exhausted.
    Scripted(Mutex<VecDeque<String>>),
    /// Return the input unchanged.
    Echo,
    /// Always fail.
    Failing,
}

/// A reply strategy returning scripted replies, echoes, or errors.
///
/// Records how often it was called, the history it saw last, and which
/// chats had their session cleared.
pub struct MockStrategy {
    name: String,
    behavior: Behavior,
    health: HealthStatus,
    calls: AtomicUsize,
    last_history: Mutex<Vec<ChatMessage>>,
    cleared: Mutex<Vec<String>>,
}

impl MockStrategy {
    fn with_behavior(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            health: HealthStatus::Healthy,
            calls: AtomicUsize::new(0),
            last_history: Mutex::new(Vec::new()),
            cleared: Mutex::new(Vec::new()),
        }
    }

    /// Replies are returned in order, then "mock reply".
    pub fn with_replies(name: &str, replies: Vec<String>) -> Self {
        Self::with_behavior(name, Behavior::Scripted(Mutex::new(replies.into())))
    }

    pub fn echo(name: &str) -> Self {
        Self::with_behavior(name, Behavior::Echo)
    }

    pub fn failing(name: &str) -> Self {
        Self::with_behavior(name, Behavior::Failing)
    }

    /// Report `Unhealthy` from `health_check`.
    pub fn unhealthy(mut self) -> Self {
        self.health = HealthStatus::Unhealthy(format!("{} is down", self.name));
        self
    }

    /// Report `Degraded`, as a strategy with no connection check does.
    pub fn without_health_check(mut self) -> Self {
        self.health = HealthStatus::Degraded(format!("{} has no health check", self.name));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// History passed to the most recent `produce_reply` call.
    pub fn last_history(&self) -> Vec<ChatMessage> {
        self.last_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn cleared_sessions(&self) -> Vec<String> {
        self.cleared.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        Ok(self.health.clone())
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyStrategy for MockStrategy {
    async fn produce_reply(
        &self,
        input: &str,
        _ctx: Option<&ConversationContext>,
        history: &[ChatMessage],
    ) -> Result<String, AgentKitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_history.lock() {
            *last = history.to_vec();
        }

        match &self.behavior {
            Behavior::Scripted(queue) => Ok(queue
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .unwrap_or_else(|| "mock reply".to_string())),
            Behavior::Echo => Ok(input.to_string()),
            Behavior::Failing => Err(AgentKitError::provider(format!(
                "{} failed",
                self.name
            ))),
        }
    }

    async fn clear_session(&self, chat_id: &str) {
        if let Ok(mut cleared) = self.cleared.lock() {
            cleared.push(chat_id.to_string());
        }
    }
}
