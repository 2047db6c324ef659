// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock log store capturing dashboard records.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use agentkit_core::{
    AdapterType, AgentKitError, BotStatus, HealthStatus, MessageLog, MessageRecord,
    PluginAdapter, StatusRecord,
};

#[derive(Default)]
pub struct MockLog {
    messages: Mutex<Vec<MessageRecord>>,
    statuses: Mutex<Vec<StatusRecord>>,
    failing: AtomicBool,
}

impl MockLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write fail without recording anything.
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<MessageRecord> {
        self.messages.lock().await.clone()
    }

    pub async fn statuses(&self) -> Vec<BotStatus> {
        self.statuses.lock().await.iter().map(|s| s.status).collect()
    }

    pub async fn status_records(&self) -> Vec<StatusRecord> {
        self.statuses.lock().await.clone()
    }

    fn check(&self) -> Result<(), AgentKitError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AgentKitError::Storage {
                source: "mock log failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockLog {
    fn name(&self) -> &str {
        "mock-log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        Ok(())
    }
}

#[async_trait]
impl MessageLog for MockLog {
    async fn log_message(&self, record: MessageRecord) -> Result<(), AgentKitError> {
        self.check()?;
        self.messages.lock().await.push(record);
        Ok(())
    }

    async fn update_status(&self, record: StatusRecord) -> Result<(), AgentKitError> {
        self.check()?;
        self.statuses.lock().await.push(record);
        Ok(())
    }
}
