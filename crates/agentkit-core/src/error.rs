// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the AgentKit relay.

use thiserror::Error;

/// The primary error type used across all AgentKit adapter traits and core operations.
#[derive(Debug, Error)]
pub enum AgentKitError {
    /// Configuration errors (invalid TOML, missing API keys, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// External log store errors (connection failure, rejected insert).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (bridge unreachable, webhook bind failure, send rejected).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// AI provider errors (non-2xx response, malformed JSON, empty completion).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A remote assistant run reached a terminal state other than `completed`.
    #[error("run ended with status `{status}`: {message}")]
    RunFailed { status: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentKitError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a channel error without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }
}
