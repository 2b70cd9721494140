//! Message sending: text, documents, chat actions, and command registration.

use super::TelegramChannel;
use crate::utils::split_message;
use pomni_core::error::PomniError;
use tracing::{info, warn};

/// Telegram's per-message character limit.
const MAX_MESSAGE_LEN: usize = 4096;

impl TelegramChannel {
    /// Send a text message to a specific chat, split into chunks if needed.
    pub(crate) async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), PomniError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let url = format!("{}/sendMessage", self.base_url);
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| PomniError::Transport(format!("telegram send failed: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                return Err(PomniError::Transport(format!(
                    "telegram send failed ({status}): {error_text}"
                )));
            }
        }

        Ok(())
    }

    /// Upload `content` as a document named `filename`.
    pub(crate) async fn send_document_bytes(
        &self,
        chat_id: i64,
        filename: &str,
        content: &[u8],
    ) -> Result<(), PomniError> {
        let url = format!("{}/sendDocument", self.base_url);

        let part = reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(filename.to_string())
            .mime_str("text/plain; charset=utf-8")
            .map_err(|e| PomniError::Transport(format!("mime error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PomniError::Transport(format!("telegram sendDocument failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(PomniError::Transport(format!(
                "telegram sendDocument failed ({status}): {error_text}"
            )));
        }

        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Приветствие" },
                { "command": "help", "description": "Что я умею" },
                { "command": "tasks", "description": "Список задач и напоминаний" },
                { "command": "done", "description": "Отметить задачу выполненной" },
                { "command": "cancel", "description": "Удалить задачу" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }

    /// Send a chat action (e.g. "typing") to a chat.
    pub(crate) async fn send_chat_action(
        &self,
        chat_id: i64,
        action: &str,
    ) -> Result<(), PomniError> {
        let url = format!("{}/sendChatAction", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": action,
        });

        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PomniError::Transport(format!("telegram sendChatAction failed: {e}")))?;

        Ok(())
    }
}
