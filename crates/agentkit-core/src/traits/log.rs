// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log trait for the external activity store read by the dashboard.

use async_trait::async_trait;

use crate::error::AgentKitError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageRecord, StatusRecord};

/// Append-only writer for dashboard records.
///
/// Callers treat every error as non-fatal: a failed write never affects
/// message delivery.
#[async_trait]
pub trait MessageLog: PluginAdapter {
    /// Appends a chat message record.
    async fn log_message(&self, record: MessageRecord) -> Result<(), AgentKitError>;

    /// Appends a bot status record.
    async fn update_status(&self, record: StatusRecord) -> Result<(), AgentKitError>;
}
