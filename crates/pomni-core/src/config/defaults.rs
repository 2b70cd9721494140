//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Pomni".to_string()
}

pub fn default_data_dir() -> String {
    "~/.pomni".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_language() -> String {
    "Russian".to_string()
}

pub fn default_provider() -> String {
    "openrouter".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_provider_timeout() -> u64 {
    60
}

pub fn default_send_timeout() -> u64 {
    30
}

pub fn default_openrouter_model() -> String {
    "qwen/qwen-2.5-72b-instruct".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_db_path() -> String {
    "~/.pomni/data/pomni.db".to_string()
}

pub fn default_poll_interval() -> u64 {
    300
}

pub fn default_daily_check_hour() -> u32 {
    9
}

pub fn default_window_minutes() -> u32 {
    5
}

pub fn default_reminder_offset() -> i64 {
    60
}

pub fn default_document_filename() -> String {
    "doc.txt".to_string()
}

pub fn default_system_prompt() -> String {
    "Ты персональный Telegram-ассистент. Отвечай по делу, кратко и понятно.".to_string()
}
