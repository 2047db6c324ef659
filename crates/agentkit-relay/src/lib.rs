// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message relay for the AgentKit WhatsApp bot.
//!
//! The [`MessageRelay`] consumes channel events, answers text commands,
//! keeps a bounded conversation buffer per chat, asks the [`AiGateway`] for
//! replies, and writes dashboard records. Messages from different chats are
//! processed concurrently; messages from the same chat are serialized.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod gateway;
pub mod pairing;
pub mod shutdown;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agentkit_core::{
    AgentKitError, BotStatus, ChannelAdapter, ChannelEvent, ChatMessage, InboundMessage,
    MessageId, MessageLog, MessageRecord, OutboundMessage, StatusRecord,
};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use buffer::ConversationBuffer;
pub use commands::Command;
pub use gateway::AiGateway;

/// Sent when the AI provider could not be reached.
pub const UNAVAILABLE_TEXT: &str =
    "⚠️ Serviço de IA temporariamente indisponível. Tente novamente em alguns instantes.";

/// Sent when every reply strategy failed.
pub const AI_FAILURE_TEXT: &str =
    "Desculpe, ocorreu um erro ao processar sua mensagem. Tente novamente em alguns instantes.";

/// Sent when the reply could not be delivered.
pub const INTERNAL_ERROR_TEXT: &str =
    "Desculpe, ocorreu um erro interno. Tente novamente mais tarde.";

/// Contact name recorded for bot messages.
pub const BOT_CONTACT_NAME: &str = "Bot";

/// How long in-flight messages may run after shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Relay settings taken from `[agent]`.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bot_name: String,
    pub history_limit: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bot_name: "AgentKit WhatsApp Bot".to_string(),
            history_limit: 20,
        }
    }
}

/// What happened to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Echo of the bot's own message.
    IgnoredSelf,
    /// Answered by a text command.
    Command,
    /// Group chat; never forwarded to the AI.
    IgnoredGroup,
    /// The AI provider was unreachable.
    Unavailable,
    /// An AI reply was produced and sent.
    Replied,
    /// All strategies failed or the reply could not be delivered.
    Failed,
}

pub struct MessageRelay {
    channel: Arc<dyn ChannelAdapter>,
    gateway: AiGateway,
    log: Arc<dyn MessageLog>,
    buffer: ConversationBuffer,
    chat_locks: DashMap<String, Arc<Mutex<()>>>,
    ai_reachable: AtomicBool,
    config: RelayConfig,
}

impl MessageRelay {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        gateway: AiGateway,
        log: Arc<dyn MessageLog>,
        config: RelayConfig,
    ) -> Self {
        Self {
            channel,
            gateway,
            log,
            buffer: ConversationBuffer::new(),
            chat_locks: DashMap::new(),
            ai_reachable: AtomicBool::new(false),
            config,
        }
    }

    pub fn buffer(&self) -> &ConversationBuffer {
        &self.buffer
    }

    pub fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    /// Runs until `cancel` fires or the channel closes.
    ///
    /// Each event is handled on its own task. On exit, in-flight tasks are
    /// given [`DRAIN_TIMEOUT`] to finish and an `offline` status is written.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<(), AgentKitError> {
        info!(
            strategies = ?self.gateway.strategy_names(),
            "message relay running"
        );
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(event) => {
                            let relay = Arc::clone(&self);
                            tasks.spawn(async move { relay.handle_event(event).await });
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive failed, stopping relay");
                            break;
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "message task panicked");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping relay");
                    break;
                }
            }
        }

        self.drain(tasks).await;
        self.write_status(StatusRecord::now(BotStatus::Offline, None)).await;
        self.gateway.shutdown().await;
        self.channel.shutdown().await?;
        info!("message relay stopped");
        Ok(())
    }

    async fn drain(&self, mut tasks: JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }
        info!(count = tasks.len(), "waiting for in-flight messages");
        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(remaining = tasks.len(), "drain timed out, aborting remaining messages");
            tasks.abort_all();
        }
    }

    /// Handles one channel event.
    pub async fn handle_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(msg) => {
                let outcome = self.handle_inbound(msg).await;
                debug!(?outcome, "inbound message handled");
            }
            ChannelEvent::QrCode(code) => {
                info!("WhatsApp pairing required, scan the QR code with your phone");
                if let Some(rendered) = pairing::render_qr(&code) {
                    println!("{rendered}");
                }
                self.write_status(StatusRecord::now(BotStatus::Connecting, Some(code)))
                    .await;
            }
            ChannelEvent::Connected => {
                info!("WhatsApp session connected");
                self.write_status(StatusRecord::now(BotStatus::Online, None)).await;
            }
            ChannelEvent::Disconnected(reason) => {
                warn!(reason = %reason, "WhatsApp session disconnected");
                self.write_status(StatusRecord::now(BotStatus::Offline, None)).await;
            }
        }
    }

    /// Processes one inbound chat message end to end.
    ///
    /// Holds the chat's lock for the whole exchange; the lock entry is
    /// dropped again once no other message for that chat is waiting.
    pub async fn handle_inbound(&self, msg: InboundMessage) -> RelayOutcome {
        if msg.from_me {
            return RelayOutcome::IgnoredSelf;
        }

        let chat_id = msg.chat_id.clone();
        let lock = self.chat_lock(&chat_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.process(msg).await
        };
        drop(lock);
        self.release_chat_lock(&chat_id);
        outcome
    }

    async fn process(&self, msg: InboundMessage) -> RelayOutcome {
        info!(chat_id = %msg.chat_id, contact = %msg.sender_name, "message received");

        if self.try_handle_command(&msg.chat_id, &msg.text).await {
            return RelayOutcome::Command;
        }

        if msg.is_group {
            debug!(chat_id = %msg.chat_id, "group message ignored");
            return RelayOutcome::IgnoredGroup;
        }

        if !self.ensure_reachable().await {
            self.reply_or_log(&msg.chat_id, UNAVAILABLE_TEXT).await;
            return RelayOutcome::Unavailable;
        }

        let history = buffer::trim(&self.buffer.get(&msg.chat_id), self.config.history_limit);
        let ctx = context::build(&msg.chat_id, &msg.sender_name, &msg.message_type, msg.is_group);
        let reply = self.gateway.produce(&msg.text, &ctx, &history).await;

        if !reply.success {
            error!(
                chat_id = %msg.chat_id,
                error = reply.error.as_deref().unwrap_or("unknown"),
                "AI reply failed"
            );
            self.reply_or_log(&msg.chat_id, AI_FAILURE_TEXT).await;
            return RelayOutcome::Failed;
        }

        let mut updated = history;
        updated.push(ChatMessage::user(msg.text.clone()));
        updated.push(ChatMessage::assistant(reply.text.clone()));
        self.buffer.replace(&msg.chat_id, updated);

        let outcome = match self.send(&msg.chat_id, &reply.text).await {
            Ok(_) => {
                info!(chat_id = %msg.chat_id, "reply sent");
                RelayOutcome::Replied
            }
            Err(e) => {
                error!(chat_id = %msg.chat_id, error = %e, "failed to send reply");
                self.reply_or_log(&msg.chat_id, INTERNAL_ERROR_TEXT).await;
                RelayOutcome::Failed
            }
        };

        self.write_message(MessageRecord::now(&msg.chat_id, &msg.sender_name, &msg.text, false))
            .await;
        self.write_message(MessageRecord::now(
            &msg.chat_id,
            BOT_CONTACT_NAME,
            &reply.text,
            true,
        ))
        .await;

        outcome
    }

    /// Answers `raw` if it is a command. Returns whether it was handled.
    pub async fn try_handle_command(&self, chat_id: &str, raw: &str) -> bool {
        let Some(command) = Command::parse(raw) else {
            return false;
        };
        debug!(chat_id, ?command, "command received");

        let text = match command {
            Command::Help => commands::help_text(&self.config.bot_name),
            Command::Clear => {
                self.buffer.clear(chat_id);
                self.gateway.clear(chat_id).await;
                commands::CLEARED_TEXT.to_string()
            }
            Command::Status => commands::status_text(
                self.buffer.tracked_chats(),
                &chrono::Local::now(),
            ),
            Command::Ping => commands::PONG_TEXT.to_string(),
            Command::Sessions => commands::sessions_text(&self.gateway.stats()),
        };

        self.reply_or_log(chat_id, &text).await;
        true
    }

    /// Checks provider reachability once; a positive result is cached.
    async fn ensure_reachable(&self) -> bool {
        if self.ai_reachable.load(Ordering::Acquire) {
            return true;
        }
        debug!("checking AI provider connection");
        let reachable = self.gateway.check_connection().await;
        if reachable {
            info!("AI provider reachable");
            self.ai_reachable.store(true, Ordering::Release);
        } else {
            warn!("AI provider unreachable");
        }
        reachable
    }

    fn chat_lock(&self, chat_id: &str) -> Arc<Mutex<()>> {
        self.chat_locks
            .entry(chat_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn release_chat_lock(&self, chat_id: &str) {
        self.chat_locks
            .remove_if(chat_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    async fn send(&self, chat_id: &str, text: &str) -> Result<MessageId, AgentKitError> {
        self.channel
            .send(OutboundMessage {
                chat_id: chat_id.to_string(),
                content: text.to_string(),
                reply_to: None,
            })
            .await
    }

    async fn reply_or_log(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.send(chat_id, text).await {
            error!(chat_id, error = %e, "failed to send message");
        }
    }

    async fn write_message(&self, record: MessageRecord) {
        if let Err(e) = self.log.log_message(record).await {
            warn!(error = %e, "failed to log message");
        }
    }

    async fn write_status(&self, record: StatusRecord) {
        let status = record.status;
        if let Err(e) = self.log.update_status(record).await {
            warn!(%status, error = %e, "failed to update bot status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkit_core::ReplyStrategy;
    use agentkit_test_utils::{inbound, MockChannel, MockLog, MockStrategy};

    const ANA: &str = "5511999999999@s.whatsapp.net";

    fn relay() -> MessageRelay {
        MessageRelay::new(
            Arc::new(MockChannel::new()),
            AiGateway::new(vec![
                Arc::new(MockStrategy::echo("echo")) as Arc<dyn ReplyStrategy>
            ]),
            Arc::new(MockLog::new()),
            RelayConfig::default(),
        )
    }

    #[tokio::test]
    async fn chat_lock_is_released_after_each_message() {
        let relay = relay();
        let replied = relay.handle_inbound(inbound(ANA, "Ana", "Oi")).await;
        assert_eq!(replied, RelayOutcome::Replied);
        let cleared = relay.handle_inbound(inbound(ANA, "Ana", "!limpar")).await;
        assert_eq!(cleared, RelayOutcome::Command);
        assert!(relay.chat_locks.is_empty());
    }

    #[tokio::test]
    async fn concurrent_messages_leave_no_lock_behind() {
        let relay = relay();
        let (a, b) = tokio::join!(
            relay.handle_inbound(inbound(ANA, "Ana", "um")),
            relay.handle_inbound(inbound(ANA, "Ana", "dois")),
        );
        assert_eq!((a, b), (RelayOutcome::Replied, RelayOutcome::Replied));
        assert_eq!(relay.buffer().get(ANA).len(), 4);
        assert!(relay.chat_locks.is_empty());
    }

    #[tokio::test]
    async fn held_lock_is_not_evicted() {
        let relay = relay();
        let held = relay.chat_lock(ANA);
        relay.release_chat_lock(ANA);
        assert_eq!(relay.chat_locks.len(), 1);

        drop(held);
        relay.release_chat_lock(ANA);
        assert!(relay.chat_locks.is_empty());
    }
}
