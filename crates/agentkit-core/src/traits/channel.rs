// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging transport.

use async_trait::async_trait;

use crate::error::AgentKitError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelEvent, MessageId, OutboundMessage};

/// Adapter for a bidirectional messaging transport.
///
/// The relay only consumes normalized [`ChannelEvent`]s and hands back
/// plain-text [`OutboundMessage`]s; protocol details stay in the adapter.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Starts receiving events from the transport.
    async fn connect(&mut self) -> Result<(), AgentKitError>;

    /// Sends a text reply through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, AgentKitError>;

    /// Waits for the next event from the channel.
    async fn receive(&self) -> Result<ChannelEvent, AgentKitError>;
}
