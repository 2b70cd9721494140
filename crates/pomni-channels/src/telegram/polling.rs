//! Long-polling update loop and Channel trait implementation.

use super::types::{TgFile, TgMessage, TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use pomni_core::{
    error::PomniError,
    message::{IncomingMessage, MessageKind, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, PomniError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let bot_token = self.config.bot_token.clone();
        let allowed_users = self.config.allowed_users.clone();
        let whisper_api_key = self.config.whisper_api_key.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let offset = last_update_id.lock().await.map(|id| id + 1);

                let mut url = format!("{base_url}/getUpdates?timeout=30");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(msg) = update.message else {
                        continue;
                    };

                    if !is_allowed(&msg, &allowed_users) {
                        continue;
                    }

                    let (text, kind) = if let Some(ref t) = msg.text {
                        (t.trim().to_string(), MessageKind::Text)
                    } else if let Some(ref voice) = msg.voice {
                        let Some(key) = whisper_api_key.as_deref().filter(|k| !k.is_empty())
                        else {
                            debug!("skipping voice (no whisper key)");
                            continue;
                        };
                        let transcript = match download_telegram_file(
                            &client,
                            &base_url,
                            &bot_token,
                            &voice.file_id,
                        )
                        .await
                        {
                            Ok(bytes) => {
                                crate::whisper::transcribe_whisper(&client, key, &bytes).await
                            }
                            Err(e) => Err(e),
                        };
                        match transcript {
                            Ok(t) => {
                                info!("transcribed voice message ({}s)", voice.duration);
                                (t, MessageKind::Voice)
                            }
                            Err(e) => {
                                warn!("voice transcription failed: {e}");
                                continue;
                            }
                        }
                    } else {
                        continue;
                    };

                    let Some(incoming) = build_incoming(msg, text, kind) else {
                        continue;
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_typing(&self, target: &str) -> Result<(), PomniError> {
        self.send_chat_action(parse_chat_id(target)?, "typing").await
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), PomniError> {
        let target = message
            .reply_target
            .as_deref()
            .ok_or_else(|| PomniError::Transport("no reply_target on outgoing message".into()))?;
        self.send_text(parse_chat_id(target)?, &message.text).await
    }

    async fn send_document(
        &self,
        target: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<(), PomniError> {
        self.send_document_bytes(parse_chat_id(target)?, filename, content)
            .await
    }

    async fn stop(&self) -> Result<(), PomniError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

fn parse_chat_id(target: &str) -> Result<i64, PomniError> {
    target
        .parse()
        .map_err(|e| PomniError::Transport(format!("invalid telegram chat_id '{target}': {e}")))
}

/// Sender is present, allowed, and writing from a private chat.
pub(super) fn is_allowed(msg: &TgMessage, allowed_users: &[i64]) -> bool {
    let Some(ref user) = msg.from else {
        return false;
    };
    if !allowed_users.is_empty() && !allowed_users.contains(&user.id) {
        warn!("ignoring message from unauthorized user {}", user.id);
        return false;
    }
    if matches!(msg.chat.chat_type.as_str(), "group" | "supergroup") {
        debug!("telegram: ignoring group message from chat {}", msg.chat.id);
        return false;
    }
    true
}

/// Convert a Telegram message plus its resolved text into an `IncomingMessage`.
pub(super) fn build_incoming(
    msg: TgMessage,
    text: String,
    kind: MessageKind,
) -> Option<IncomingMessage> {
    let user = msg.from?;
    if text.is_empty() {
        return None;
    }
    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        sender_id: user.id.to_string(),
        sender_name: Some(user.display_name()),
        text,
        kind,
        timestamp: chrono::Utc::now(),
        reply_target: Some(msg.chat.id.to_string()),
    })
}

/// Download a file from Telegram servers by file_id.
async fn download_telegram_file(
    client: &reqwest::Client,
    base_url: &str,
    bot_token: &str,
    file_id: &str,
) -> Result<Vec<u8>, PomniError> {
    // Step 1: getFile to obtain file_path.
    let url = format!("{base_url}/getFile?file_id={file_id}");
    let resp: TgResponse<TgFile> = client
        .get(&url)
        .send()
        .await
        .map_err(|e| PomniError::Transport(format!("telegram getFile failed: {e}")))?
        .json()
        .await
        .map_err(|e| PomniError::Transport(format!("telegram getFile parse failed: {e}")))?;

    let file_path = resp
        .result
        .and_then(|f| f.file_path)
        .ok_or_else(|| PomniError::Transport("telegram getFile returned no file_path".into()))?;

    // Step 2: Download the actual file bytes.
    let download_url = format!("https://api.telegram.org/file/bot{bot_token}/{file_path}");
    let bytes = client
        .get(&download_url)
        .send()
        .await
        .map_err(|e| PomniError::Transport(format!("telegram file download failed: {e}")))?
        .bytes()
        .await
        .map_err(|e| PomniError::Transport(format!("telegram file read failed: {e}")))?;

    Ok(bytes.to_vec())
}
