use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the user sent the message. Voice is transcribed to text by the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Voice,
}

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific user ID. Owns any task created from this message.
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content (already transcribed for voice messages).
    pub text: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
}

impl IncomingMessage {
    /// Where replies go: the explicit reply target, or the sender itself.
    pub fn target(&self) -> &str {
        self.reply_target.as_deref().unwrap_or(&self.sender_id)
    }
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub metadata: MessageMetadata,
    /// Platform-specific target for routing (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
}

impl OutgoingMessage {
    /// Plain text addressed to `target`.
    pub fn text(target: &str, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: MessageMetadata::default(),
            reply_target: Some(target.to_string()),
        }
    }
}

/// Metadata about how a message was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which provider produced this response.
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_falls_back_to_sender() {
        let mut msg = IncomingMessage {
            id: Uuid::new_v4(),
            channel: "telegram".into(),
            sender_id: "42".into(),
            sender_name: None,
            text: "hi".into(),
            kind: MessageKind::Text,
            timestamp: Utc::now(),
            reply_target: None,
        };
        assert_eq!(msg.target(), "42");
        msg.reply_target = Some("100".into());
        assert_eq!(msg.target(), "100");
    }

    #[test]
    fn test_message_kind_defaults_to_text() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "channel": "telegram",
            "sender_id": "1",
            "sender_name": null,
            "text": "hello",
            "timestamp": "2026-01-01T00:00:00Z"
        }"#;
        let msg: IncomingMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.reply_target.is_none());
    }
}
