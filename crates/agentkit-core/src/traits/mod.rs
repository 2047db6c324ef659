// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod log;
pub mod strategy;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use log::MessageLog;
pub use strategy::ReplyStrategy;
