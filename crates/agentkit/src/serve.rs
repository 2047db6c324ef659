// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `agentkit serve` command implementation.
//!
//! Builds the reply strategy chain for the configured backend, the dashboard
//! log store and the WhatsApp channel, then runs the message relay until a
//! shutdown signal arrives.

use std::sync::Arc;

use agentkit_config::AgentKitConfig;
use agentkit_core::{AgentKitError, ChannelAdapter};
use agentkit_relay::shutdown;
use agentkit_relay::{AiGateway, MessageRelay, RelayConfig};
use agentkit_whatsapp::WhatsAppChannel;
use tracing::info;

/// Runs the `agentkit serve` command.
pub async fn run_serve(config: AgentKitConfig) -> Result<(), AgentKitError> {
    init_tracing(&config.agent.log_level);

    info!(
        name = %config.agent.name,
        backend = ?config.openai.backend,
        model = %config.openai.model,
        "starting agentkit serve"
    );

    let strategies = agentkit_openai::build_strategies(&config).await?;
    let gateway = AiGateway::new(strategies);
    info!(strategies = ?gateway.strategy_names(), "reply strategies configured");

    let log = agentkit_supabase::from_config(&config.supabase)?;

    let mut channel = WhatsAppChannel::new(config.whatsapp.clone())?;
    channel.connect().await?;
    info!(
        host = %config.whatsapp.webhook_host,
        port = config.whatsapp.webhook_port,
        instance = %config.whatsapp.instance_name,
        "WhatsApp channel connected"
    );

    let relay = Arc::new(MessageRelay::new(
        Arc::new(channel),
        gateway,
        log,
        RelayConfig {
            bot_name: config.agent.name.clone(),
            history_limit: config.agent.history_limit,
        },
    ));

    let cancel = shutdown::install_signal_handler();
    relay.run(cancel).await?;

    info!("agentkit serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agentkit={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
