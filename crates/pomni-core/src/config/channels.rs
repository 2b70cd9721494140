use serde::{Deserialize, Serialize};

use super::defaults::default_send_timeout;

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Upper bound for a single outbound send on any channel, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
    pub telegram: Option<TelegramConfig>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout(),
            telegram: None,
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Telegram user IDs allowed to talk to the bot. Empty = allow all.
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    /// OpenAI API key for Whisper voice transcription. Presence = voice enabled.
    #[serde(default)]
    pub whisper_api_key: Option<String>,
}
