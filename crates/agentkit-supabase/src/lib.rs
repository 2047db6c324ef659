// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard log store for the AgentKit relay.
//!
//! [`SupabaseLog`] appends rows to two PostgREST tables (`messages` and
//! `bot_status`). [`NoopLog`] stands in when no credentials are configured.

use std::sync::Arc;
use std::time::Duration;

use agentkit_config::model::{value_or_env, SupabaseConfig};
use agentkit_core::{
    AdapterType, AgentKitError, HealthStatus, MessageLog, MessageRecord, PluginAdapter,
    StatusRecord,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use tracing::{debug, info};

/// PostgREST-backed message log.
#[derive(Debug, Clone)]
pub struct SupabaseLog {
    client: reqwest::Client,
    rest_url: String,
    messages_table: String,
    status_table: String,
}

impl SupabaseLog {
    pub fn new(
        url: &str,
        anon_key: &str,
        messages_table: impl Into<String>,
        status_table: impl Into<String>,
    ) -> Result<Self, AgentKitError> {
        let invalid =
            |e: reqwest::header::InvalidHeaderValue| AgentKitError::Config(format!("invalid Supabase key header value: {e}"));

        let mut apikey = HeaderValue::from_str(anon_key).map_err(invalid)?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {anon_key}")).map_err(invalid)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AgentKitError::Storage {
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            messages_table: messages_table.into(),
            status_table: status_table.into(),
        })
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<(), AgentKitError> {
        let url = format!("{}/{table}", self.rest_url);
        let response = self
            .client
            .post(&url)
            .json(row)
            .send()
            .await
            .map_err(|e| AgentKitError::Storage {
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentKitError::Storage {
                source: format!("insert into {table} returned {status}: {body}").into(),
            });
        }
        debug!(table, "row inserted");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SupabaseLog {
    fn name(&self) -> &str {
        "supabase"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        let url = format!("{}/{}?select=chat_id&limit=1", self.rest_url, self.messages_table);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Unhealthy(format!("status {}", resp.status()))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        Ok(())
    }
}

#[async_trait]
impl MessageLog for SupabaseLog {
    async fn log_message(&self, record: MessageRecord) -> Result<(), AgentKitError> {
        self.insert(&self.messages_table, &record).await
    }

    async fn update_status(&self, record: StatusRecord) -> Result<(), AgentKitError> {
        self.insert(&self.status_table, &record).await
    }
}

/// Log store that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLog;

#[async_trait]
impl PluginAdapter for NoopLog {
    fn name(&self) -> &str {
        "noop-log"
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
impl MessageLog for NoopLog {
    async fn log_message(&self, _record: MessageRecord) -> Result<(), AgentKitError> {
        Ok(())
    }

    async fn update_status(&self, _record: StatusRecord) -> Result<(), AgentKitError> {
        Ok(())
    }
}

/// Builds the log store from `[supabase]`, falling back to `SUPABASE_URL` /
/// `SUPABASE_ANON_KEY`. Missing credentials yield a [`NoopLog`].
pub fn from_config(config: &SupabaseConfig) -> Result<Arc<dyn MessageLog>, AgentKitError> {
    let url = value_or_env(&config.url, "SUPABASE_URL");
    let key = value_or_env(&config.anon_key, "SUPABASE_ANON_KEY");

    match (url, key) {
        (Some(url), Some(key)) => {
            info!(url = %url, "Supabase message log enabled");
            Ok(Arc::new(SupabaseLog::new(
                &url,
                &key,
                config.messages_table.clone(),
                config.status_table.clone(),
            )?))
        }
        _ => {
            info!("Supabase credentials not configured, message logging disabled");
            Ok(Arc::new(NoopLog))
        }
    }
}
