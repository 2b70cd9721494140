//! Tests for the Telegram channel module.

use super::polling::{build_incoming, is_allowed};
use super::types::*;
use crate::utils::split_message;
use pomni_core::message::MessageKind;

fn message(json: &str) -> TgMessage {
    serde_json::from_str(json).unwrap()
}

const PRIVATE_TEXT: &str = r#"{
    "message_id": 1,
    "from": {"id": 42, "first_name": "Koyomi", "username": "araragi"},
    "chat": {"id": 42, "type": "private"},
    "text": "напомни купить молоко"
}"#;

#[test]
fn test_split_short_message() {
    let chunks = split_message("hello", 4096);
    assert_eq!(chunks, vec!["hello"]);
}

#[test]
fn test_split_long_message() {
    let text = "a\n".repeat(3000);
    let chunks = split_message(&text, 4096);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 4096);
    }
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_split_cyrillic_on_char_boundary() {
    // Each Cyrillic letter is 2 bytes; an odd limit would land mid-char.
    let text = "ж".repeat(5000);
    let chunks = split_message(&text, 4095);
    assert_eq!(chunks.concat(), text);
    for chunk in &chunks {
        assert!(chunk.len() <= 4095);
    }
}

#[test]
fn test_tg_message_with_voice() {
    let json = r#"{
        "message_id": 1,
        "chat": {"id": 100, "type": "private"},
        "voice": {"file_id": "abc123", "duration": 5, "mime_type": "audio/ogg"}
    }"#;
    let msg = message(json);
    assert!(msg.text.is_none());
    let voice = msg.voice.unwrap();
    assert_eq!(voice.file_id, "abc123");
    assert_eq!(voice.duration, 5);
}

#[test]
fn test_tg_chat_type_defaults_when_missing() {
    let chat: TgChat = serde_json::from_str(r#"{"id": 123}"#).unwrap();
    assert_eq!(chat.chat_type, "");
}

#[test]
fn test_is_allowed_private_chat() {
    let msg = message(PRIVATE_TEXT);
    assert!(is_allowed(&msg, &[]));
    assert!(is_allowed(&msg, &[42]));
    assert!(!is_allowed(&msg, &[7]));
}

#[test]
fn test_is_allowed_rejects_groups_and_anonymous() {
    let group = message(
        r#"{"from": {"id": 42, "first_name": "K"}, "chat": {"id": -100, "type": "supergroup"}, "text": "hi"}"#,
    );
    assert!(!is_allowed(&group, &[]));

    let anonymous = message(r#"{"chat": {"id": 5, "type": "private"}, "text": "hi"}"#);
    assert!(!is_allowed(&anonymous, &[]));
}

#[test]
fn test_build_incoming_text() {
    let msg = message(PRIVATE_TEXT);
    let text = msg.text.clone().unwrap();
    let incoming = build_incoming(msg, text, MessageKind::Text).unwrap();
    assert_eq!(incoming.channel, "telegram");
    assert_eq!(incoming.sender_id, "42");
    assert_eq!(incoming.sender_name.as_deref(), Some("@araragi"));
    assert_eq!(incoming.reply_target.as_deref(), Some("42"));
    assert_eq!(incoming.kind, MessageKind::Text);
    assert_eq!(incoming.text, "напомни купить молоко");
}

#[test]
fn test_build_incoming_skips_empty_text() {
    let msg = message(PRIVATE_TEXT);
    assert!(build_incoming(msg, String::new(), MessageKind::Voice).is_none());
}

#[test]
fn test_display_name_fallbacks() {
    let user: TgUser =
        serde_json::from_str(r#"{"id": 1, "first_name": "Koyomi", "last_name": "Araragi"}"#)
            .unwrap();
    assert_eq!(user.display_name(), "Koyomi Araragi");
    let user: TgUser = serde_json::from_str(r#"{"id": 1, "first_name": "Koyomi"}"#).unwrap();
    assert_eq!(user.display_name(), "Koyomi");
}
