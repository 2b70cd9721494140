mod channels;
mod defaults;
mod providers;


pub use channels::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::PomniError;
use defaults::*;

/// Top-level Pomni configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pomni: PomniConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub router: RouterConfig,
}

/// General assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomniConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Language of bot replies ("Russian" or "English").
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for PomniConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            language: default_language(),
        }
    }
}

/// Task store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Scheduler configuration: daily recurring announcements and due reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Local hour (0-23) at which recurring tasks are announced.
    #[serde(default = "default_daily_check_hour")]
    pub daily_check_hour: u32,
    /// Minutes after the top of `daily_check_hour` during which a poll fires.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    /// Announce each recurring task at most once per local day.
    /// Off by default: every poll landing in the window re-sends.
    #[serde(default)]
    pub once_per_day: bool,
    /// Deliver one-shot reminders once their `remind_at` has passed.
    #[serde(default = "default_true")]
    pub deliver_reminders: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval(),
            daily_check_hour: default_daily_check_hour(),
            window_minutes: default_window_minutes(),
            once_per_day: false,
            deliver_reminders: true,
        }
    }
}

impl SchedulerConfig {
    /// Whether at least one poll is guaranteed to land inside the daily window.
    ///
    /// When this is false a whole day's announcements can be skipped.
    pub fn window_covered(&self) -> bool {
        self.poll_interval_secs <= u64::from(self.window_minutes) * 60
    }
}

/// Message routing config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Fixed delay applied to every reminder. The message text is not parsed for a time.
    #[serde(default = "default_reminder_offset")]
    pub reminder_offset_minutes: i64,
    /// File name used when a generated answer is delivered as a document.
    #[serde(default = "default_document_filename")]
    pub document_filename: String,
    /// System prompt sent with every answer-engine request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            reminder_offset_minutes: default_reminder_offset(),
            document_filename: default_document_filename(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Apply credentials from the environment on top of the file config.
///
/// `BOT_TOKEN` also enables Telegram, creating the section if absent.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get("BOT_TOKEN") {
        let tg = config.channel.telegram.get_or_insert_with(TelegramConfig::default);
        tg.bot_token = token;
        tg.enabled = true;
    }
    if let Some(key) = get("WHISPER_API_KEY") {
        if let Some(tg) = config.channel.telegram.as_mut() {
            tg.whisper_api_key = Some(key);
        }
    }
    if let Some(key) = get("OPENROUTER_API_KEY") {
        config
            .provider
            .openrouter
            .get_or_insert_with(OpenRouterConfig::default)
            .api_key = key;
    }
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, PomniError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PomniError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str::<Config>(&content)
            .map_err(|e| PomniError::Config(format!("failed to parse config: {}", e)))?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

/// Longest accepted reminder offset: one year.
pub const MAX_REMINDER_OFFSET_MINUTES: i64 = 366 * 24 * 60;

/// Reject values that would make scheduling meaningless.
pub fn validate(config: &Config) -> Result<(), PomniError> {
    let scheduler = &config.scheduler;
    if !(0..24).contains(&scheduler.daily_check_hour) {
        return Err(PomniError::Config(format!(
            "scheduler.daily_check_hour must be 0-23, got {}",
            scheduler.daily_check_hour
        )));
    }
    if !(1..=60).contains(&scheduler.window_minutes) {
        return Err(PomniError::Config(format!(
            "scheduler.window_minutes must be 1-60, got {}",
            scheduler.window_minutes
        )));
    }
    let offset = config.router.reminder_offset_minutes;
    if !(1..=MAX_REMINDER_OFFSET_MINUTES).contains(&offset) {
        return Err(PomniError::Config(format!(
            "router.reminder_offset_minutes must be 1-{MAX_REMINDER_OFFSET_MINUTES}, got {offset}"
        )));
    }
    Ok(())
}
