// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./agentkit.toml` > `~/.config/agentkit/agentkit.toml` >
//! `/etc/agentkit/agentkit.toml` with environment variable overrides via `AGENTKIT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AgentKitConfig;

/// Local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = "agentkit.toml";

/// System-wide configuration file path.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/agentkit/agentkit.toml";

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("agentkit").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/agentkit/agentkit.toml` (system-wide)
/// 3. `~/.config/agentkit/agentkit.toml` (user XDG config)
/// 4. `./agentkit.toml` (local directory)
/// 5. `AGENTKIT_*` environment variables
pub fn load_config() -> Result<AgentKitConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AgentKitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AgentKitConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AgentKitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AgentKitConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AgentKitConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `AGENTKIT_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `AGENTKIT_OPENAI_API_KEY` must become `openai.api_key`,
/// not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("AGENTKIT_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["agent", "openai", "whatsapp", "supabase"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
