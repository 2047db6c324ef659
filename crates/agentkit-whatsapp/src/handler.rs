// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evolution API webhook payload parsing.
//!
//! Converts raw webhook JSON into [`ChannelEvent`]s. Events the relay has no
//! use for (presence, receipts, contacts sync) produce nothing.

use agentkit_core::{ChannelEvent, InboundMessage};
use serde_json::Value;
use tracing::debug;

pub const EVENT_MESSAGES_UPSERT: &str = "messages.upsert";
pub const EVENT_QRCODE_UPDATED: &str = "qrcode.updated";
pub const EVENT_CONNECTION_UPDATE: &str = "connection.update";

/// Suffix of group chat JIDs.
const GROUP_SUFFIX: &str = "@g.us";

/// Normalizes an event name from either the payload (`messages.upsert`) or a
/// per-event webhook path segment (`messages-upsert`, `MESSAGES_UPSERT`).
pub fn normalize_event_name(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', '_'], ".")
}

/// Parses a webhook payload. `path_event` is the optional `{event}` path segment.
pub fn parse_webhook(payload: &Value, path_event: Option<&str>) -> Vec<ChannelEvent> {
    let event = payload["event"]
        .as_str()
        .or(path_event)
        .map(normalize_event_name)
        .unwrap_or_default();

    match event.as_str() {
        EVENT_MESSAGES_UPSERT => parse_messages(&payload["data"])
            .into_iter()
            .map(ChannelEvent::Message)
            .collect(),
        EVENT_QRCODE_UPDATED => parse_qr(&payload["data"])
            .map(ChannelEvent::QrCode)
            .into_iter()
            .collect(),
        EVENT_CONNECTION_UPDATE => parse_connection(&payload["data"]).into_iter().collect(),
        other => {
            debug!(event = other, "ignoring webhook event");
            Vec::new()
        }
    }
}

/// `data` is either a single message object or an array of them.
fn parse_messages(data: &Value) -> Vec<InboundMessage> {
    match data.as_array() {
        Some(items) => items.iter().filter_map(parse_message).collect(),
        None => parse_message(data).into_iter().collect(),
    }
}

/// Parses one message; returns `None` for entries without text (media, reactions, stubs).
pub fn parse_message(msg: &Value) -> Option<InboundMessage> {
    let key = &msg["key"];
    let chat_id = key["remoteJid"].as_str().filter(|j| !j.is_empty())?;

    let body = &msg["message"];
    let text = body["conversation"]
        .as_str()
        .or_else(|| body["extendedTextMessage"]["text"].as_str())
        .filter(|t| !t.trim().is_empty())?;

    let message_type = msg["messageType"]
        .as_str()
        .map(str::to_string)
        .or_else(|| {
            body.as_object()
                .and_then(|o| o.keys().find(|k| k.as_str() != "messageContextInfo").cloned())
        })
        .unwrap_or_else(|| "conversation".to_string());

    let sender_name = msg["pushName"]
        .as_str()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(chat_id)
        .to_string();

    let timestamp = msg["messageTimestamp"]
        .as_i64()
        .or_else(|| msg["messageTimestamp"].as_str().and_then(|s| s.parse().ok()))
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(chrono::Utc::now)
        .to_rfc3339();

    Some(InboundMessage {
        id: key["id"].as_str().unwrap_or_default().to_string(),
        chat_id: chat_id.to_string(),
        sender_name,
        text: text.to_string(),
        message_type,
        is_group: chat_id.ends_with(GROUP_SUFFIX),
        from_me: key["fromMe"].as_bool().unwrap_or(false),
        timestamp,
    })
}

/// Prefers the raw pairing code (renderable as a QR) over the PNG data URL.
pub fn parse_qr(data: &Value) -> Option<String> {
    let qr = &data["qrcode"];
    qr["code"]
        .as_str()
        .or_else(|| qr["base64"].as_str())
        .or_else(|| qr.as_str())
        .or_else(|| data["code"].as_str())
        .or_else(|| data["base64"].as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_connection(data: &Value) -> Option<ChannelEvent> {
    let state = data["state"].as_str().unwrap_or_default();
    match state {
        "open" | "connected" => Some(ChannelEvent::Connected),
        "close" | "closed" | "disconnected" => {
            let reason = data["statusReason"]
                .as_i64()
                .map(|code| format!("status {code}"))
                .unwrap_or_else(|| state.to_string());
            Some(ChannelEvent::Disconnected(reason))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upsert(remote_jid: &str, from_me: bool, message: Value) -> Value {
        json!({
            "event": "messages.upsert",
            "instance": "agentkit",
            "data": {
                "key": {"remoteJid": remote_jid, "fromMe": from_me, "id": "ABC123"},
                "pushName": "Ana",
                "message": message,
                "messageType": "conversation",
                "messageTimestamp": 1_767_225_600
            }
        })
    }

    fn single_message(events: Vec<ChannelEvent>) -> InboundMessage {
        match events.as_slice() {
            [ChannelEvent::Message(m)] => m.clone(),
            other => panic!("expected one message, got {other:?}"),
        }
    }

    #[test]
    fn parses_plain_conversation() {
        let payload = upsert("5511999@s.whatsapp.net", false, json!({"conversation": "Oi"}));
        let msg = single_message(parse_webhook(&payload, None));
        assert_eq!(msg.id, "ABC123");
        assert_eq!(msg.chat_id, "5511999@s.whatsapp.net");
        assert_eq!(msg.sender_name, "Ana");
        assert_eq!(msg.text, "Oi");
        assert!(!msg.is_group);
        assert!(!msg.from_me);
        assert!(msg.timestamp.starts_with("2026-01-01"));
    }

    #[test]
    fn parses_extended_text_and_group_flag() {
        let payload = upsert(
            "12036@g.us",
            false,
            json!({"extendedTextMessage": {"text": "bom dia"}}),
        );
        let msg = single_message(parse_webhook(&payload, None));
        assert_eq!(msg.text, "bom dia");
        assert!(msg.is_group);
    }

    #[test]
    fn keeps_from_me_flag() {
        let payload = upsert("5511999@s.whatsapp.net", true, json!({"conversation": "eco"}));
        assert!(single_message(parse_webhook(&payload, None)).from_me);
    }

    #[test]
    fn media_without_text_is_skipped() {
        let payload = upsert(
            "5511999@s.whatsapp.net",
            false,
            json!({"imageMessage": {"mimetype": "image/jpeg"}}),
        );
        assert!(parse_webhook(&payload, None).is_empty());
    }

    #[test]
    fn sender_name_falls_back_to_chat_id() {
        let mut payload = upsert("5511999@s.whatsapp.net", false, json!({"conversation": "Oi"}));
        payload["data"]["pushName"] = Value::Null;
        let msg = single_message(parse_webhook(&payload, None));
        assert_eq!(msg.sender_name, "5511999@s.whatsapp.net");
    }

    #[test]
    fn array_data_yields_each_message() {
        let payload = json!({
            "event": "messages.upsert",
            "data": [
                {"key": {"remoteJid": "a@s.whatsapp.net", "id": "1"}, "message": {"conversation": "um"}},
                {"key": {"remoteJid": "b@s.whatsapp.net", "id": "2"}, "message": {"conversation": "dois"}}
            ]
        });
        assert_eq!(parse_webhook(&payload, None).len(), 2);
    }

    #[test]
    fn qr_prefers_raw_code() {
        let payload = json!({
            "event": "qrcode.updated",
            "data": {"qrcode": {"code": "2@abc", "base64": "data:image/png;base64,xyz"}}
        });
        match parse_webhook(&payload, None).as_slice() {
            [ChannelEvent::QrCode(code)] => assert_eq!(code, "2@abc"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn connection_states_map_to_events() {
        let open = json!({"event": "connection.update", "data": {"state": "open"}});
        assert!(matches!(parse_webhook(&open, None).as_slice(), [ChannelEvent::Connected]));

        let close = json!({"event": "connection.update", "data": {"state": "close", "statusReason": 401}});
        match parse_webhook(&close, None).as_slice() {
            [ChannelEvent::Disconnected(reason)] => assert_eq!(reason, "status 401"),
            other => panic!("unexpected {other:?}"),
        }

        let connecting = json!({"event": "connection.update", "data": {"state": "connecting"}});
        assert!(parse_webhook(&connecting, None).is_empty());
    }

    #[test]
    fn event_name_can_come_from_path() {
        let payload = json!({"data": {"state": "open"}});
        let events = parse_webhook(&payload, Some("connection-update"));
        assert!(matches!(events.as_slice(), [ChannelEvent::Connected]));
        assert_eq!(normalize_event_name("MESSAGES_UPSERT"), "messages.upsert");
    }
}
