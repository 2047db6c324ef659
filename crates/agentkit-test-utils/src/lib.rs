// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for AgentKit integration tests.
//!
//! Provides mock adapters and a relay harness for fast, deterministic tests
//! without a WhatsApp bridge, OpenAI, or Supabase.
//!
//! # Components
//!
//! - [`MockChannel`] - Channel with event injection and outbound capture
//! - [`MockStrategy`] - Reply strategy with scripted replies or failures
//! - [`MockLog`] - Log store capturing message and status records
//! - [`TestHarness`] - A [`MessageRelay`](agentkit_relay::MessageRelay) wired to the mocks

pub mod harness;
pub mod mock_channel;
pub mod mock_log;
pub mod mock_strategy;

pub use harness::{inbound, TestHarness};
pub use mock_channel::MockChannel;
pub use mock_log::MockLog;
pub use mock_strategy::MockStrategy;
