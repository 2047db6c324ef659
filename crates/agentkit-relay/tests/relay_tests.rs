// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end relay tests driven through the mock harness.

use std::sync::Arc;
use std::time::Duration;

use agentkit_core::{BotStatus, ChannelEvent, Role};
use agentkit_relay::commands::{CLEARED_TEXT, PONG_TEXT};
use agentkit_relay::{RelayOutcome, AI_FAILURE_TEXT, BOT_CONTACT_NAME, UNAVAILABLE_TEXT};
use agentkit_test_utils::{inbound, MockStrategy, TestHarness};
use tokio_util::sync::CancellationToken;

const ANA: &str = "5511999999999@s.whatsapp.net";
const BRUNO: &str = "5511888888888@s.whatsapp.net";
const GROUP: &str = "120363000000000000@g.us";

async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn greeting_is_answered_buffered_and_logged() {
    let harness = TestHarness::builder()
        .with_replies(vec!["Olá, Ana!".to_string()])
        .build();

    let outcome = harness.send(ANA, "Ana", "Oi").await;

    assert_eq!(outcome, RelayOutcome::Replied);
    assert_eq!(harness.replies_to(ANA).await, vec!["Olá, Ana!"]);

    let history = harness.relay.buffer().get(ANA);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "Oi");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "Olá, Ana!");

    let records = harness.log.messages().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].contact_name, "Ana");
    assert_eq!(records[0].message_text, "Oi");
    assert!(!records[0].is_from_bot);
    assert_eq!(records[1].contact_name, BOT_CONTACT_NAME);
    assert_eq!(records[1].message_text, "Olá, Ana!");
    assert!(records[1].is_from_bot);
}

#[tokio::test]
async fn clear_only_affects_its_own_chat() {
    let harness = TestHarness::builder().build();
    harness.send(ANA, "Ana", "um").await;
    harness.send(BRUNO, "Bruno", "dois").await;

    let outcome = harness.send(ANA, "Ana", "!limpar").await;

    assert_eq!(outcome, RelayOutcome::Command);
    assert!(harness.relay.buffer().get(ANA).is_empty());
    assert_eq!(harness.relay.buffer().get(BRUNO).len(), 2);
    assert_eq!(harness.strategy.cleared_sessions(), vec![ANA.to_string()]);
    assert_eq!(harness.relay.gateway().stats(), vec![(BRUNO.to_string(), 1)]);
    assert_eq!(harness.replies_to(ANA).await.last().map(String::as_str), Some(CLEARED_TEXT));
}

#[tokio::test]
async fn group_messages_never_reach_the_ai() {
    let harness = TestHarness::builder().build();

    let outcome = harness.send(GROUP, "Carla", "alguém aí?").await;

    assert_eq!(outcome, RelayOutcome::IgnoredGroup);
    assert_eq!(harness.strategy.call_count(), 0);
    assert!(harness.replies_to(GROUP).await.is_empty());
    assert!(harness.log.messages().await.is_empty());
}

#[tokio::test]
async fn commands_are_answered_in_groups() {
    let harness = TestHarness::builder().build();
    assert_eq!(harness.send(GROUP, "Carla", "!ping").await, RelayOutcome::Command);
    assert_eq!(harness.replies_to(GROUP).await, vec![PONG_TEXT]);
    assert_eq!(harness.strategy.call_count(), 0);
}

#[tokio::test]
async fn own_messages_are_ignored() {
    let harness = TestHarness::builder().build();
    for text in ["!ping", "Oi, tudo bem?"] {
        let mut msg = inbound(ANA, "Ana", text);
        msg.from_me = true;
        assert_eq!(harness.relay.handle_inbound(msg).await, RelayOutcome::IgnoredSelf);
    }

    assert_eq!(harness.channel.sent_count().await, 0);
    assert!(harness.relay.buffer().get(ANA).is_empty());
    assert!(harness.log.messages().await.is_empty());
    assert_eq!(harness.strategy.call_count(), 0);
}

#[tokio::test]
async fn commands_ignore_case_and_whitespace() {
    let harness = TestHarness::builder().with_bot_name("Atendente").build();

    assert_eq!(harness.send(ANA, "Ana", "  !PING ").await, RelayOutcome::Command);
    assert_eq!(harness.send(ANA, "Ana", "!Help").await, RelayOutcome::Command);

    let replies = harness.replies_to(ANA).await;
    assert_eq!(replies[0], PONG_TEXT);
    assert!(replies[1].starts_with("🤖 *Atendente*"));
    assert_eq!(harness.strategy.call_count(), 0);
}

#[tokio::test]
async fn status_and_sessions_report_activity() {
    let harness = TestHarness::builder().build();
    harness.send(ANA, "Ana", "oi").await;
    harness.send(ANA, "Ana", "tudo bem?").await;

    harness.send(BRUNO, "Bruno", "!status").await;
    harness.send(BRUNO, "Bruno", "!stats").await;

    let replies = harness.replies_to(BRUNO).await;
    assert!(replies[0].contains("Conversas ativas: 1"));
    assert!(replies[1].contains("Total de execuções: 2"));
    assert!(replies[1].contains("(2)"));
}

#[tokio::test]
async fn unreachable_provider_gets_unavailable_notice() {
    let harness = TestHarness::builder()
        .with_strategy(MockStrategy::echo("down").unhealthy())
        .build();

    let outcome = harness.send(ANA, "Ana", "Oi").await;

    assert_eq!(outcome, RelayOutcome::Unavailable);
    assert_eq!(harness.replies_to(ANA).await, vec![UNAVAILABLE_TEXT]);
    assert_eq!(harness.strategy.call_count(), 0);
    assert!(harness.relay.buffer().get(ANA).is_empty());
}

#[tokio::test]
async fn failed_reply_sends_apology_and_keeps_history() {
    let harness = TestHarness::builder()
        .with_strategy(MockStrategy::failing("broken"))
        .build();

    let outcome = harness.send(ANA, "Ana", "Oi").await;

    assert_eq!(outcome, RelayOutcome::Failed);
    assert_eq!(harness.replies_to(ANA).await, vec![AI_FAILURE_TEXT]);
    assert!(harness.relay.buffer().get(ANA).is_empty());
    assert!(harness.log.messages().await.is_empty());
}

#[tokio::test]
async fn send_failure_still_logs_the_exchange() {
    let harness = TestHarness::builder()
        .with_replies(vec!["resposta".to_string()])
        .build();
    harness.channel.fail_sends();

    let outcome = harness.send(ANA, "Ana", "Oi").await;

    assert_eq!(outcome, RelayOutcome::Failed);
    assert_eq!(harness.log.messages().await.len(), 2);
}

#[tokio::test]
async fn log_failures_do_not_block_replies() {
    let harness = TestHarness::builder().build();
    harness.log.fail_writes();

    assert_eq!(harness.send(ANA, "Ana", "Oi").await, RelayOutcome::Replied);
    assert_eq!(harness.replies_to(ANA).await, vec!["Oi"]);
}

#[tokio::test]
async fn history_passed_to_ai_is_trimmed() {
    let harness = TestHarness::builder().with_history_limit(3).build();
    for text in ["a", "b", "c", "d"] {
        harness.send(ANA, "Ana", text).await;
    }

    let seen = harness.strategy.last_history();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.last().map(|m| m.content.as_str()), Some("c"));
    assert!(harness.relay.buffer().get(ANA).len() <= 5);
}

#[tokio::test]
async fn same_chat_messages_are_serialized() {
    let harness = TestHarness::builder().build();
    let relay = harness.relay.clone();

    let (a, b) = tokio::join!(
        relay.handle_inbound(inbound(ANA, "Ana", "primeira")),
        relay.handle_inbound(inbound(ANA, "Ana", "segunda")),
    );

    assert_eq!(a, RelayOutcome::Replied);
    assert_eq!(b, RelayOutcome::Replied);
    assert_eq!(harness.relay.buffer().get(ANA).len(), 4);
}

#[tokio::test]
async fn run_processes_events_and_goes_offline_on_cancel() {
    let harness = TestHarness::builder().build();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Arc::clone(&harness.relay).run(cancel.clone()));

    harness
        .channel
        .inject_event(ChannelEvent::QrCode("2@pairing-code".to_string()))
        .await;
    harness.channel.inject_event(ChannelEvent::Connected).await;
    harness.channel.inject_message(inbound(ANA, "Ana", "Oi")).await;

    let channel = harness.channel.clone();
    wait_until(|| {
        let channel = channel.clone();
        async move { channel.sent_count().await == 1 }
    })
    .await;
    let log = harness.log.clone();
    wait_until(|| {
        let log = log.clone();
        async move { log.statuses().await.len() == 2 }
    })
    .await;

    cancel.cancel();
    task.await.unwrap().unwrap();

    let statuses = harness.log.statuses().await;
    assert!(statuses.contains(&BotStatus::Connecting));
    assert!(statuses.contains(&BotStatus::Online));
    assert_eq!(statuses.last(), Some(&BotStatus::Offline));
    let qr = harness
        .log
        .status_records()
        .await
        .into_iter()
        .find(|r| r.status == BotStatus::Connecting)
        .and_then(|r| r.qr_code);
    assert_eq!(qr.as_deref(), Some("2@pairing-code"));
    assert!(harness.channel.is_shut_down());
}

#[tokio::test]
async fn run_stops_when_channel_closes() {
    let harness = TestHarness::builder().build();
    harness.channel.close();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        Arc::clone(&harness.relay).run(CancellationToken::new()),
    )
    .await
    .expect("relay did not stop");

    assert!(result.is_ok());
    assert_eq!(harness.log.statuses().await, vec![BotStatus::Offline]);
}
